//! Effective visibility of profile fields.
//!
//! Stored field settings are combined with fixed policy for the account
//! identifier and password attributes:
//!
//! - the identifier field is always unique and required
//! - the password field is always required, never public and never listed
//!
//! Everything here is pure; nothing touches storage or the field catalog.

use serde::{Deserialize, Serialize};

use super::models::profile_field::{FormVisibility, ProfileField, PublicVisibility};
use crate::domains::member::PublicFieldSelections;

pub const PASSWORD_FIELD: &str = "Password";
pub const DEFAULT_IDENTIFIER_FIELD: &str = "Email";

/// Hard-coded policy for protected member attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFields {
    identifier_field: String,
}

impl SystemFields {
    pub fn new(identifier_field: impl Into<String>) -> Self {
        Self {
            identifier_field: identifier_field.into(),
        }
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    pub fn is_always_required(&self, member_field: &str) -> bool {
        member_field == self.identifier_field || member_field == PASSWORD_FIELD
    }

    pub fn is_always_unique(&self, member_field: &str) -> bool {
        member_field == self.identifier_field
    }

    pub fn is_never_public(&self, member_field: &str) -> bool {
        member_field == PASSWORD_FIELD
    }
}

impl Default for SystemFields {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_FIELD)
    }
}

/// Where a field is being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    /// The member editing their own profile
    ProfileEdit,
    /// The public registration form
    Registration,
    /// The public member listing table
    PublicListing,
    /// A member's public profile page
    PublicDetail,
    /// Administrators editing the member record
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPresentation {
    Editable,
    Readonly,
    Hidden,
}

impl From<FormVisibility> for FieldPresentation {
    fn from(visibility: FormVisibility) -> Self {
        match visibility {
            FormVisibility::Edit => FieldPresentation::Editable,
            FormVisibility::Readonly => FieldPresentation::Readonly,
            FormVisibility::Hidden => FieldPresentation::Hidden,
        }
    }
}

/// Field settings an administrator may not change for this field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSettings {
    pub unique: bool,
    pub required: bool,
    pub member_list_visible: bool,
    pub public_visibility: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityResolver {
    system: SystemFields,
}

impl VisibilityResolver {
    pub fn new(system: SystemFields) -> Self {
        Self { system }
    }

    pub fn system(&self) -> &SystemFields {
        &self.system
    }

    pub fn effective_unique(&self, field: &ProfileField) -> bool {
        field.unique || self.system.is_always_unique(&field.member_field)
    }

    pub fn effective_required(&self, field: &ProfileField) -> bool {
        field.required || self.system.is_always_required(&field.member_field)
    }

    pub fn effective_public_visibility(&self, field: &ProfileField) -> PublicVisibility {
        if self.system.is_never_public(&field.member_field) {
            return PublicVisibility::Hidden;
        }
        field.public_visibility
    }

    pub fn effective_member_list_visible(&self, field: &ProfileField) -> bool {
        field.member_list_visible && !self.system.is_never_public(&field.member_field)
    }

    pub fn locked_settings(&self, field: &ProfileField) -> LockedSettings {
        let never_public = self.system.is_never_public(&field.member_field);
        LockedSettings {
            unique: self.system.is_always_unique(&field.member_field),
            required: self.system.is_always_required(&field.member_field),
            member_list_visible: never_public,
            public_visibility: never_public,
        }
    }

    /// Whether a member's public profile shows this field, given the
    /// member's own opt-in choices.
    pub fn is_publicly_shown(&self, field: &ProfileField, selections: &PublicFieldSelections) -> bool {
        match self.effective_public_visibility(field) {
            PublicVisibility::Display => true,
            PublicVisibility::MemberChoice => selections.contains(&field.member_field),
            PublicVisibility::Hidden => false,
        }
    }

    /// Listing cells withhold MemberChoice values the member has not opted into.
    pub fn is_withheld_from_listing(
        &self,
        field: &ProfileField,
        selections: &PublicFieldSelections,
    ) -> bool {
        self.effective_public_visibility(field) == PublicVisibility::MemberChoice
            && !selections.contains(&field.member_field)
    }

    pub fn presentation(
        &self,
        field: &ProfileField,
        context: ViewContext,
        selections: &PublicFieldSelections,
    ) -> FieldPresentation {
        match context {
            ViewContext::ProfileEdit => field.profile_visibility.into(),
            ViewContext::Registration => field.registration_visibility.into(),
            ViewContext::PublicListing if self.effective_member_list_visible(field) => {
                FieldPresentation::Readonly
            }
            ViewContext::PublicDetail if self.is_publicly_shown(field, selections) => {
                FieldPresentation::Readonly
            }
            ViewContext::PublicListing | ViewContext::PublicDetail => FieldPresentation::Hidden,
            ViewContext::Admin => FieldPresentation::Editable,
        }
    }
}
