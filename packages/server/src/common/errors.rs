use thiserror::Error;

use super::auth::AuthError;
use super::entity_ids::{MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
use crate::domains::member::LoginBlocked;

/// A rule or request refers to a member attribute the member form does not
/// define. Raised by the field-definition provider and propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Unknown member field: {0}")]
    UnknownMemberField(String),
}

/// Errors surfaced by profile activities
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    AuthenticationBlocked(#[from] LoginBlocked),

    #[error("Profile page not found: {0}")]
    PageNotFound(ProfilePageId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Profile field not found: {0}")]
    FieldNotFound(ProfileFieldId),

    #[error("Profile section not found: {0}")]
    SectionNotFound(ProfileSectionId),

    #[error("Member {0} is not shown on this profile page")]
    MemberNotListed(MemberId),

    #[error("Field {0} cannot be made public by the member")]
    NotMemberChoice(String),

    #[error("Invalid validation token")]
    InvalidValidationToken,

    #[error("Invalid credentials")]
    UnknownAccount,

    #[error("An account already exists for {0}")]
    IdentifierTaken(String),

    #[error("{0} is already used by another member")]
    DuplicateValue(String),

    #[error("{0} is required")]
    MissingRequiredField(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type ProfileResult<T> = Result<T, ProfileError>;
