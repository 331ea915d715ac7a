//! Member listings and public profile pages.

mod common;

use crate::common::{create_member, create_page, create_rule, open_settings, TestHarness};
use member_profiles::common::{GroupId, ProfileError};
use member_profiles::domains::listing::activities::{list_members, view_member};
use member_profiles::domains::listing::ListingValue;
use member_profiles::domains::member::activities::update_public_fields;
use member_profiles::domains::member::{Member, MemberState};
use member_profiles::domains::profile_fields::{FieldSettings, PublicVisibility, PASSWORD_FIELD};
use member_profiles::domains::profile_pages::NotificationType;
use member_profiles::domains::profile_sections::{NewProfileSection, SectionContent};
use member_profiles::kernel::{BaseProfileStore, ListingWindow};

#[tokio::test]
async fn listing_withholds_unchosen_values() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    create_rule(&harness, page.id, "Email", open_settings(PublicVisibility::MemberChoice)).await;
    create_rule(&harness, page.id, "FirstName", open_settings(PublicVisibility::Display)).await;
    let mut member = Member::new("ada@example.org", MemberState::unrestricted());
    member.profile_page_id = Some(page.id);
    member.first_name = Some("Ada".to_string());
    let member = harness.store.add_member(member);

    let listing = list_members(page.id, ListingWindow::default(), &harness.deps)
        .await
        .unwrap();

    assert_eq!(listing.title, "Member List");
    assert_eq!(listing.total, 1);
    let cells = &listing.rows[0].cells;
    assert_eq!(cells[0].name, "Email");
    assert_eq!(cells[0].value, ListingValue::NoValue);
    assert!(cells[0].sortable);
    assert_eq!(cells[0].link, page.member_link(member.id));
    assert_eq!(cells[1].value, ListingValue::Value(Some("Ada".to_string())));
}

#[tokio::test]
async fn listing_never_shows_password() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    create_rule(&harness, page.id, PASSWORD_FIELD, open_settings(PublicVisibility::Display)).await;
    create_member(&harness, &page, "ada@example.org", false, false);

    let listing = list_members(page.id, ListingWindow::default(), &harness.deps)
        .await
        .unwrap();

    assert!(listing.rows[0].cells.is_empty());
}

#[tokio::test]
async fn listing_is_limited_to_page_groups() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    let group = GroupId::new();
    harness.store.restrict_page_to_group(page.id, group);
    let insider = create_member(&harness, &page, "ada@example.org", false, false);
    let outsider = create_member(&harness, &page, "grace@example.org", false, false);
    harness.store.add_member_to_group(insider.id, group);

    let listing = list_members(page.id, ListingWindow::default(), &harness.deps)
        .await
        .unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.rows[0].member_id, insider.id);

    let result = view_member(page.id, outsider.id, None, &harness.deps).await;
    assert!(matches!(result, Err(ProfileError::MemberNotListed(id)) if id == outsider.id));
}

#[tokio::test]
async fn listing_window_pages_through_members() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    for email in ["a@example.org", "b@example.org", "c@example.org"] {
        create_member(&harness, &page, email, false, false);
    }

    let window = ListingWindow {
        offset: 2,
        limit: 2,
    };
    let listing = list_members(page.id, window, &harness.deps).await.unwrap();

    assert_eq!(listing.total, 3);
    assert_eq!(listing.rows.len(), 1);
    assert_eq!(listing.offset, 2);
}

#[tokio::test]
async fn profile_detail_follows_member_choices() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    create_rule(&harness, page.id, "Email", open_settings(PublicVisibility::MemberChoice)).await;
    create_rule(&harness, page.id, "Surname", open_settings(PublicVisibility::Hidden)).await;
    let custom = FieldSettings {
        custom_title: Some("Given name".to_string()),
        ..open_settings(PublicVisibility::Display)
    };
    create_rule(&harness, page.id, "FirstName", custom).await;
    harness
        .store
        .insert_section(NewProfileSection::fields_list(page.id))
        .await
        .unwrap();
    let member = create_member(&harness, &page, "ada@example.org", false, false);

    let anonymous = view_member(page.id, member.id, None, &harness.deps)
        .await
        .unwrap();
    assert_eq!(anonymous.title, "ada@example.org's Profile");
    assert!(!anonymous.is_self);
    assert_eq!(anonymous.sections.len(), 1);
    assert_eq!(anonymous.sections[0].title, None);
    let SectionContent::FieldsList { entries } = &anonymous.sections[0].content;
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["FirstName"]);
    assert_eq!(entries[0].title, "Given name");

    let actor = harness.member_actor(member.id);
    update_public_fields(member.id, vec!["Email".to_string()], &actor, &harness.deps)
        .await
        .unwrap();

    let own = view_member(page.id, member.id, Some(&actor), &harness.deps)
        .await
        .unwrap();
    assert!(own.is_self);
    let SectionContent::FieldsList { entries } = &own.sections[0].content;
    let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["Email", "FirstName"]);
    assert_eq!(entries[0].value.as_deref(), Some("ada@example.org"));
}

#[tokio::test]
async fn viewing_missing_records() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    let missing = member_profiles::common::MemberId::new();

    assert!(matches!(
        view_member(page.id, missing, None, &harness.deps).await,
        Err(ProfileError::MemberNotFound(_))
    ));
    assert!(matches!(
        list_members(
            member_profiles::common::ProfilePageId::new(),
            ListingWindow::default(),
            &harness.deps
        )
        .await,
        Err(ProfileError::PageNotFound(_))
    ));
}
