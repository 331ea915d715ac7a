//! Test fixtures for pages, field rules and members.

use member_profiles::common::ProfilePageId;
use member_profiles::domains::member::{Member, MemberState};
use member_profiles::domains::profile_fields::{
    FieldSettings, FormVisibility, NewProfileField, ProfileField, PublicVisibility,
};
use member_profiles::domains::profile_pages::{NotificationType, ProfilePage};
use member_profiles::kernel::BaseProfileStore;

use super::TestHarness;

pub fn create_page(
    harness: &TestHarness,
    email_type: NotificationType,
    requires_approval: bool,
) -> ProfilePage {
    harness.store.add_page("members", email_type, requires_approval)
}

/// Editable everywhere, listed, with the given public visibility.
pub fn open_settings(public_visibility: PublicVisibility) -> FieldSettings {
    FieldSettings::builder()
        .profile_visibility(FormVisibility::Edit)
        .registration_visibility(FormVisibility::Edit)
        .member_list_visible(true)
        .public_visibility(public_visibility)
        .build()
}

pub async fn create_rule(
    harness: &TestHarness,
    page_id: ProfilePageId,
    member_field: &str,
    settings: FieldSettings,
) -> ProfileField {
    harness
        .store
        .insert_field(NewProfileField::new(page_id, member_field).with_settings(settings))
        .await
        .expect("Failed to insert field rule")
}

/// A member registered through `page` with the given workflow flags.
pub fn create_member(
    harness: &TestHarness,
    page: &ProfilePage,
    email: &str,
    needs_validation: bool,
    needs_approval: bool,
) -> Member {
    let mut state = MemberState::unrestricted();
    state.needs_validation = needs_validation;
    state.needs_approval = needs_approval;

    let mut member = Member::new(email, state);
    member.profile_page_id = Some(page.id);
    harness.store.add_member(member)
}
