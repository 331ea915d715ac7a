//! Field rule and section administration behind the access guard.

mod common;

use std::sync::Arc;

use crate::common::{create_page, create_rule, open_settings, TestHarness};
use member_profiles::common::auth::{
    AccessAction, AccessExtension, AccessRequest, Actor, AuthError, Verdict,
};
use member_profiles::common::{ConfigurationError, MemberId, ProfileError};
use member_profiles::domains::profile_fields::activities::{
    create_field, delete_field, form_plan, list_field_summaries, update_field,
};
use member_profiles::domains::profile_fields::{
    FieldSettings, FormContext, NewProfileField, PublicVisibility, PASSWORD_FIELD,
};
use member_profiles::domains::profile_pages::NotificationType;
use member_profiles::domains::profile_sections::activities::{
    create_section, delete_section, rename_section,
};
use member_profiles::domains::profile_sections::NewProfileSection;
use member_profiles::kernel::test_dependencies::MockPermissions;
use member_profiles::kernel::{BaseProfileStore, TestDependencies};

/// Denies creating rules for one member field and defers everything else.
struct NoPublicSurname;

impl AccessExtension for NoPublicSurname {
    fn decide(&self, request: &AccessRequest<'_>) -> Verdict {
        let surname = request
            .context
            .attributes
            .get("member_field")
            .is_some_and(|field| field == "Surname");
        if request.action == AccessAction::Create && surname {
            Verdict::Deny
        } else {
            Verdict::Undecided
        }
    }
}

// ============================================================================
// Field rules
// ============================================================================

#[tokio::test]
async fn sort_order_continues_across_pages() {
    let harness = TestHarness::new();
    let first = create_page(&harness, NotificationType::None, false);
    let second = create_page(&harness, NotificationType::None, false);
    let admin = harness.admin();

    let a = create_field(NewProfileField::new(first.id, "Email"), Some(&admin), &harness.deps)
        .await
        .unwrap();
    let b = create_field(NewProfileField::new(second.id, "Email"), Some(&admin), &harness.deps)
        .await
        .unwrap();
    let mut explicit = NewProfileField::new(first.id, "FirstName");
    explicit.sort_order = Some(10);
    let c = create_field(explicit, Some(&admin), &harness.deps)
        .await
        .unwrap();

    assert_eq!(a.sort_order, 1);
    assert_eq!(b.sort_order, 2);
    assert_eq!(c.sort_order, 10);
}

#[tokio::test]
async fn unknown_member_field_is_a_configuration_error() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);

    let result = create_field(
        NewProfileField::new(page.id, "ShoeSize"),
        Some(&harness.admin()),
        &harness.deps,
    )
    .await;

    assert!(matches!(
        result,
        Err(ProfileError::Configuration(ConfigurationError::UnknownMemberField(field)))
            if field == "ShoeSize"
    ));
    assert_eq!(harness.store.field_count(), 0);
}

#[tokio::test]
async fn extension_overrides_page_permission() {
    let harness = TestHarness::from_dependencies(
        TestDependencies::new().with_access_extension(Arc::new(NoPublicSurname)),
    );
    let page = create_page(&harness, NotificationType::None, false);
    let admin = harness.admin();

    let denied = create_field(NewProfileField::new(page.id, "Surname"), Some(&admin), &harness.deps).await;
    assert!(matches!(
        denied,
        Err(ProfileError::Auth(AuthError::AccessDenied {
            action: AccessAction::Create,
            ..
        }))
    ));

    create_field(NewProfileField::new(page.id, "FirstName"), Some(&admin), &harness.deps)
        .await
        .unwrap();
    assert_eq!(harness.store.field_count(), 1);
}

#[tokio::test]
async fn page_denial_beats_site_wide_edit() {
    let editor = MemberId::new();
    let harness = TestHarness::from_dependencies(
        TestDependencies::new().mock_permissions(
            MockPermissions::new()
                .deny_on_pages(AccessAction::Edit)
                .grant_site_wide_edit(editor),
        ),
    );
    let page = create_page(&harness, NotificationType::None, false);
    let field = create_rule(&harness, page.id, "Surname", FieldSettings::default()).await;
    let settings = FieldSettings::builder().required(true).build();

    let result = update_field(field.id, settings, Some(&Actor::new(editor, false)), &harness.deps).await;

    assert!(matches!(
        result,
        Err(ProfileError::Auth(AuthError::AccessDenied { .. }))
    ));
}

#[tokio::test]
async fn orphaned_rule_uses_site_wide_permission() {
    let editor = MemberId::new();
    let harness = TestHarness::from_dependencies(
        TestDependencies::new()
            .mock_permissions(MockPermissions::new().grant_site_wide_edit(editor)),
    );
    let page = create_page(&harness, NotificationType::None, false);
    let mut orphan = NewProfileField::new(page.id, "Surname");
    orphan.profile_page_id = None;
    let field = harness.store.insert_field(orphan).await.unwrap();

    let updated = update_field(
        field.id,
        FieldSettings::builder().required(true).build(),
        Some(&Actor::new(editor, false)),
        &harness.deps,
    )
    .await
    .unwrap();
    assert!(updated.required);

    let anonymous = delete_field(field.id, None, &harness.deps).await;
    assert!(matches!(anonymous, Err(ProfileError::Auth(_))));
    assert_eq!(harness.store.field_count(), 1);
}

#[tokio::test]
async fn summaries_lock_system_settings() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    create_rule(&harness, page.id, "Email", FieldSettings::default()).await;
    create_rule(&harness, page.id, PASSWORD_FIELD, open_settings(PublicVisibility::Display)).await;

    let summaries = list_field_summaries(page.id, None, &harness.deps)
        .await
        .unwrap();

    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].locked.unique);
    assert!(summaries[0].locked.required);
    assert!(summaries[1].locked.public_visibility);
    assert!(summaries[1].locked.member_list_visible);
    assert!(summaries[1].effective_required);
}

#[tokio::test]
async fn form_plan_omits_hidden_fields() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    create_rule(&harness, page.id, "Email", open_settings(PublicVisibility::Hidden)).await;
    create_rule(&harness, page.id, "Surname", FieldSettings::default()).await;

    let plan = form_plan(page.id, FormContext::Registration, &harness.deps)
        .await
        .unwrap();

    let names: Vec<_> = plan.iter().map(|field| field.member_field.as_str()).collect();
    assert_eq!(names, vec!["Email"]);
    assert!(plan[0].required);
}

// ============================================================================
// Sections
// ============================================================================

#[tokio::test]
async fn sections_order_within_their_page() {
    let harness = TestHarness::new();
    let first = create_page(&harness, NotificationType::None, false);
    let second = create_page(&harness, NotificationType::None, false);
    let admin = harness.admin();

    let a = create_section(NewProfileSection::fields_list(first.id), Some(&admin), &harness.deps)
        .await
        .unwrap();
    let b = create_section(NewProfileSection::fields_list(first.id), Some(&admin), &harness.deps)
        .await
        .unwrap();
    let c = create_section(NewProfileSection::fields_list(second.id), Some(&admin), &harness.deps)
        .await
        .unwrap();

    assert_eq!((a.sort_order, b.sort_order, c.sort_order), (1, 2, 1));
    assert_eq!(a.title(), "Profile Fields List");
}

#[tokio::test]
async fn section_rename_and_delete() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    let admin = harness.admin();
    let section = create_section(NewProfileSection::fields_list(page.id), Some(&admin), &harness.deps)
        .await
        .unwrap();

    let renamed = rename_section(section.id, Some("About".to_string()), Some(&admin), &harness.deps)
        .await
        .unwrap();
    assert_eq!(renamed.title(), "About");

    let cleared = rename_section(section.id, None, Some(&admin), &harness.deps)
        .await
        .unwrap();
    assert_eq!(cleared.title(), "Profile Fields List");

    delete_section(section.id, Some(&admin), &harness.deps)
        .await
        .unwrap();
    assert!(matches!(
        delete_section(section.id, Some(&admin), &harness.deps).await,
        Err(ProfileError::SectionNotFound(_))
    ));
}
