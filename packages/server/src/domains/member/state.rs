//! Member workflow state: email validation and administrator approval.
//!
//! Both flags gate authentication independently. A member awaiting
//! approval *and* validation is told about both at once.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::public_fields::PublicFieldSelections;
use crate::domains::profile_pages::{NotificationType, ProfilePage};

/// Length of a validation token in hex characters.
pub const VALIDATION_TOKEN_LEN: usize = 40;

/// A fresh random token for the emailed validation link.
///
/// Generated once when the account is created and never rotated.
pub fn generate_validation_token() -> String {
    let mut bytes = [0u8; VALIDATION_TOKEN_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginBlocker {
    ApprovalRequired,
    ValidationRequired,
}

impl fmt::Display for LoginBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginBlocker::ApprovalRequired => {
                f.write_str("an administrator must approve this account")
            }
            LoginBlocker::ValidationRequired => {
                f.write_str("the email address has not been validated")
            }
        }
    }
}

/// Authentication refused. Always carries at least one reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Login blocked: {}", describe(.reasons))]
pub struct LoginBlocked {
    reasons: BTreeSet<LoginBlocker>,
}

fn describe(reasons: &BTreeSet<LoginBlocker>) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoginBlocked {
    /// `None` when there is nothing blocking the login.
    pub fn from_reasons(reasons: impl IntoIterator<Item = LoginBlocker>) -> Option<Self> {
        let reasons: BTreeSet<_> = reasons.into_iter().collect();
        (!reasons.is_empty()).then_some(Self { reasons })
    }

    pub fn reasons(&self) -> &BTreeSet<LoginBlocker> {
        &self.reasons
    }

    pub fn contains(&self, reason: LoginBlocker) -> bool {
        self.reasons.contains(&reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    AwaitingApproval,
    AwaitingValidation,
    AwaitingApprovalAndValidation,
}

/// A persisted value before and after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub before: T,
    pub after: T,
}

impl FieldChange<bool> {
    /// The flag was set and has now been cleared.
    pub fn is_release(&self) -> bool {
        self.before && !self.after
    }
}

/// Whether clearing `needs_approval` should email the member.
pub fn approval_notice_due(change: FieldChange<bool>, email_type: NotificationType) -> bool {
    change.is_release() && email_type.sends_email()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MemberState {
    pub needs_validation: bool,
    pub needs_approval: bool,
    #[sqlx(rename = "validation_key")]
    #[serde(skip_serializing, default)]
    pub validation_token: String,
    pub public_fields: PublicFieldSelections,
}

impl MemberState {
    /// Initial state of an account registered through `page`.
    pub fn for_registration(page: &ProfilePage, public_fields: PublicFieldSelections) -> Self {
        Self {
            needs_validation: page.email_type == NotificationType::Validation,
            needs_approval: page.requires_approval,
            validation_token: generate_validation_token(),
            public_fields,
        }
    }

    /// Accounts created outside of a profile page start unrestricted.
    pub fn unrestricted() -> Self {
        Self {
            needs_validation: false,
            needs_approval: false,
            validation_token: generate_validation_token(),
            public_fields: PublicFieldSelections::default(),
        }
    }

    pub fn can_log_in(&self) -> Result<(), LoginBlocked> {
        let mut reasons = Vec::new();
        if self.needs_approval {
            reasons.push(LoginBlocker::ApprovalRequired);
        }
        if self.needs_validation {
            reasons.push(LoginBlocker::ValidationRequired);
        }

        match LoginBlocked::from_reasons(reasons) {
            Some(blocked) => Err(blocked),
            None => Ok(()),
        }
    }

    pub fn status(&self) -> AccountStatus {
        match (self.needs_approval, self.needs_validation) {
            (false, false) => AccountStatus::Active,
            (true, false) => AccountStatus::AwaitingApproval,
            (false, true) => AccountStatus::AwaitingValidation,
            (true, true) => AccountStatus::AwaitingApprovalAndValidation,
        }
    }

    /// Constant-time comparison against the stored token.
    pub fn token_matches(&self, candidate: &str) -> bool {
        let stored = self.validation_token.as_bytes();
        let candidate = candidate.as_bytes();
        stored.len() == candidate.len()
            && stored
                .iter()
                .zip(candidate)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ProfilePageId;
    use chrono::Utc;

    fn page(email_type: NotificationType, requires_approval: bool) -> ProfilePage {
        ProfilePage {
            id: ProfilePageId::new(),
            title: "Members".to_string(),
            url_segment: "members".to_string(),
            email_type,
            requires_approval,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_is_forty_hex_chars() {
        let token = generate_validation_token();

        assert_eq!(token.len(), VALIDATION_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_validation_token());
    }

    #[test]
    fn test_both_blockers_reported_together() {
        let state = MemberState::for_registration(
            &page(NotificationType::Validation, true),
            PublicFieldSelections::default(),
        );

        let blocked = state.can_log_in().unwrap_err();
        assert!(blocked.contains(LoginBlocker::ApprovalRequired));
        assert!(blocked.contains(LoginBlocker::ValidationRequired));
        assert_eq!(state.status(), AccountStatus::AwaitingApprovalAndValidation);
    }

    #[test]
    fn test_single_blocker() {
        let mut state = MemberState::unrestricted();
        state.needs_validation = true;

        let blocked = state.can_log_in().unwrap_err();
        assert_eq!(blocked.reasons().len(), 1);
        assert!(blocked.contains(LoginBlocker::ValidationRequired));
    }

    #[test]
    fn test_confirmation_page_does_not_require_validation() {
        let state = MemberState::for_registration(
            &page(NotificationType::Confirmation, false),
            PublicFieldSelections::default(),
        );

        assert!(state.can_log_in().is_ok());
        assert_eq!(state.status(), AccountStatus::Active);
    }

    #[test]
    fn test_empty_reasons_are_not_a_block() {
        assert!(LoginBlocked::from_reasons([]).is_none());
    }

    #[test]
    fn test_approval_notice_only_on_release() {
        let release = FieldChange {
            before: true,
            after: false,
        };
        let repeat = FieldChange {
            before: false,
            after: false,
        };
        let revoke = FieldChange {
            before: false,
            after: true,
        };

        assert!(approval_notice_due(release, NotificationType::Confirmation));
        assert!(approval_notice_due(release, NotificationType::Validation));
        assert!(!approval_notice_due(release, NotificationType::None));
        assert!(!approval_notice_due(repeat, NotificationType::Confirmation));
        assert!(!approval_notice_due(revoke, NotificationType::Confirmation));
    }

    #[test]
    fn test_token_match() {
        let state = MemberState::unrestricted();
        let token = state.validation_token.clone();

        assert!(state.token_matches(&token));
        assert!(!state.token_matches(&token[..39]));
        assert!(!state.token_matches(&"0".repeat(VALIDATION_TOKEN_LEN)));
    }
}
