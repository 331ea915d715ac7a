//! Approval, email validation and the login gate.

mod common;

use crate::common::{create_member, create_page, TestHarness};
use member_profiles::common::auth::AuthError;
use member_profiles::common::{MemberId, ProfileError};
use member_profiles::domains::member::activities::{
    apply_manual_email_validation, approve_member, check_login, confirm_with_token,
    resend_confirmation, set_needs_approval, ManualEmailValidation,
};
use member_profiles::domains::member::{AccountStatus, LoginBlocker};
use member_profiles::domains::profile_pages::NotificationType;
use member_profiles::kernel::test_dependencies::RecordingMailer;
use member_profiles::kernel::TestDependencies;

// ============================================================================
// Approval
// ============================================================================

#[tokio::test]
async fn approving_twice_sends_one_notice() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Confirmation, true);
    let member = create_member(&harness, &page, "ada@example.org", false, true);
    let admin = harness.admin();

    let first = approve_member(member.id, &admin, &harness.deps).await.unwrap();
    let second = approve_member(member.id, &admin, &harness.deps).await.unwrap();

    assert!(first.is_release());
    assert!(!second.is_release());
    assert_eq!(harness.mailer.sent(), vec![(page.id, member.id)]);
    assert!(!harness.store.member(member.id).unwrap().state.needs_approval);
}

#[tokio::test]
async fn approval_on_silent_page_sends_nothing() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, true);
    let member = create_member(&harness, &page, "ada@example.org", false, true);

    approve_member(member.id, &harness.admin(), &harness.deps)
        .await
        .unwrap();

    assert_eq!(harness.mailer.sent_count(), 0);
    assert!(!harness.store.member(member.id).unwrap().state.needs_approval);
}

#[tokio::test]
async fn failed_notice_keeps_approval() {
    let harness = TestHarness::from_dependencies(
        TestDependencies::new().mock_mailer(RecordingMailer::failing()),
    );
    let page = create_page(&harness, NotificationType::Validation, true);
    let member = create_member(&harness, &page, "ada@example.org", false, true);

    let change = approve_member(member.id, &harness.admin(), &harness.deps)
        .await
        .unwrap();

    assert!(change.is_release());
    assert_eq!(harness.mailer.sent_count(), 1);
    assert!(!harness.store.member(member.id).unwrap().state.needs_approval);
}

#[tokio::test]
async fn revoking_approval_sends_nothing() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Confirmation, false);
    let member = create_member(&harness, &page, "ada@example.org", false, false);

    let change = set_needs_approval(member.id, true, &harness.admin(), &harness.deps)
        .await
        .unwrap();

    assert!(!change.before);
    assert!(change.after);
    assert_eq!(harness.mailer.sent_count(), 0);
}

#[tokio::test]
async fn approval_requires_member_manager() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Confirmation, true);
    let member = create_member(&harness, &page, "ada@example.org", false, true);
    let other = harness.member_actor(MemberId::new());

    let result = approve_member(member.id, &other, &harness.deps).await;

    assert!(matches!(
        result,
        Err(ProfileError::Auth(AuthError::PermissionDenied(_)))
    ));
    assert!(harness.store.member(member.id).unwrap().state.needs_approval);
}

#[tokio::test]
async fn approving_unknown_member_is_not_found() {
    let harness = TestHarness::new();
    let missing = MemberId::new();

    let result = approve_member(missing, &harness.admin(), &harness.deps).await;

    assert!(matches!(result, Err(ProfileError::MemberNotFound(id)) if id == missing));
}

// ============================================================================
// Email validation
// ============================================================================

#[tokio::test]
async fn token_confirms_and_stays_valid() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Validation, false);
    let member = create_member(&harness, &page, "ada@example.org", true, false);
    let token = member.state.validation_token.clone();

    confirm_with_token(member.id, &token, &harness.deps)
        .await
        .unwrap();
    confirm_with_token(member.id, &token, &harness.deps)
        .await
        .unwrap();

    assert!(!harness.store.member(member.id).unwrap().state.needs_validation);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Validation, false);
    let member = create_member(&harness, &page, "ada@example.org", true, false);

    let result = confirm_with_token(member.id, "not-the-token", &harness.deps).await;

    assert!(matches!(result, Err(ProfileError::InvalidValidationToken)));
    assert!(harness.store.member(member.id).unwrap().state.needs_validation);
}

#[tokio::test]
async fn manual_validation_choices() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Validation, false);
    let member = create_member(&harness, &page, "ada@example.org", true, false);
    let admin = harness.admin();

    apply_manual_email_validation(
        member.id,
        ManualEmailValidation::Unconfirmed,
        &admin,
        &harness.deps,
    )
    .await
    .unwrap();
    assert!(harness.store.member(member.id).unwrap().state.needs_validation);
    assert_eq!(harness.mailer.sent_count(), 0);

    apply_manual_email_validation(member.id, ManualEmailValidation::Resend, &admin, &harness.deps)
        .await
        .unwrap();
    assert_eq!(harness.mailer.sent_count(), 1);

    apply_manual_email_validation(member.id, ManualEmailValidation::Confirm, &admin, &harness.deps)
        .await
        .unwrap();
    assert!(!harness.store.member(member.id).unwrap().state.needs_validation);
    assert_eq!(harness.mailer.sent_count(), 1);
}

#[tokio::test]
async fn resend_skips_silent_pages() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::None, false);
    let member = create_member(&harness, &page, "ada@example.org", true, false);

    let sent = resend_confirmation(member.id, &harness.admin(), &harness.deps)
        .await
        .unwrap();

    assert!(!sent);
    assert_eq!(harness.mailer.sent_count(), 0);
}

// ============================================================================
// Login gate
// ============================================================================

#[tokio::test]
async fn login_reports_every_blocker() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Validation, true);
    create_member(&harness, &page, "ada@example.org", true, true);

    let blocked = match check_login("ada@example.org", &harness.deps).await {
        Err(ProfileError::AuthenticationBlocked(blocked)) => blocked,
        other => panic!("expected blocked login, got {:?}", other.map(|m| m.id)),
    };

    assert!(blocked.contains(LoginBlocker::ApprovalRequired));
    assert!(blocked.contains(LoginBlocker::ValidationRequired));
    assert_eq!(blocked.reasons().len(), 2);
}

#[tokio::test]
async fn login_succeeds_once_released() {
    let harness = TestHarness::new();
    let page = create_page(&harness, NotificationType::Validation, true);
    let member = create_member(&harness, &page, "ada@example.org", true, true);
    let admin = harness.admin();

    approve_member(member.id, &admin, &harness.deps).await.unwrap();
    apply_manual_email_validation(member.id, ManualEmailValidation::Confirm, &admin, &harness.deps)
        .await
        .unwrap();

    let logged_in = check_login("ADA@example.org", &harness.deps).await.unwrap();
    assert_eq!(logged_in.id, member.id);
    assert_eq!(logged_in.state.status(), AccountStatus::Active);
}

#[tokio::test]
async fn login_with_unknown_email() {
    let harness = TestHarness::new();

    let result = check_login("nobody@example.org", &harness.deps).await;

    assert!(matches!(result, Err(ProfileError::UnknownAccount)));
}
