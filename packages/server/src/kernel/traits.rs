// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Visibility and workflow rules live in the domains and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseProfileStore, BaseConfirmationMailer)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::auth::{AccessAction, Actor, SiteCapability};
use crate::common::{GroupId, MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
use crate::domains::member::{FieldChange, Member, PublicFieldSelections};
use crate::domains::profile_fields::{FieldSettings, NewProfileField, ProfileField};
use crate::domains::profile_pages::ProfilePage;
use crate::domains::profile_sections::{NewProfileSection, ProfileSection};

// =============================================================================
// Permission Primitives (Infrastructure - host permission checks)
// =============================================================================

pub trait BasePermissionService: Send + Sync {
    /// Whether the actor holds a site-wide capability
    fn has_capability(&self, actor: &Actor, capability: SiteCapability) -> bool;

    /// The profile page's own permission for an action
    fn page_permits(&self, action: AccessAction, actor: Option<&Actor>, page: &ProfilePage)
        -> bool;
}

// =============================================================================
// Confirmation Mailer Trait (Infrastructure - email transport)
// =============================================================================

#[async_trait]
pub trait BaseConfirmationMailer: Send + Sync {
    /// Send the page's confirmation or validation email to the member
    async fn send(&self, page: &ProfilePage, member: &Member) -> Result<()>;
}

// =============================================================================
// Profile Store Trait (Infrastructure - persistence)
// =============================================================================

/// Offset/limit window over a member listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingWindow {
    pub offset: i64,
    pub limit: i64,
}

impl Default for ListingWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    // Pages
    async fn find_page(&self, id: ProfilePageId) -> Result<Option<ProfilePage>>;

    /// Groups a member must belong to in order to be listed on the page
    async fn page_groups(&self, id: ProfilePageId) -> Result<Vec<GroupId>>;

    // Fields
    /// Fields of a page ordered by sort order, then creation
    async fn fields_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileField>>;

    async fn find_field(&self, id: ProfileFieldId) -> Result<Option<ProfileField>>;

    /// Insert a field; unset sort order becomes the global maximum plus one
    async fn insert_field(&self, new: NewProfileField) -> Result<ProfileField>;

    async fn update_field(&self, id: ProfileFieldId, settings: &FieldSettings)
        -> Result<ProfileField>;

    async fn delete_field(&self, id: ProfileFieldId) -> Result<()>;

    // Sections
    async fn sections_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileSection>>;

    async fn find_section(&self, id: ProfileSectionId) -> Result<Option<ProfileSection>>;

    async fn insert_section(&self, new: NewProfileSection) -> Result<ProfileSection>;

    async fn rename_section(
        &self,
        id: ProfileSectionId,
        custom_title: Option<&str>,
    ) -> Result<ProfileSection>;

    async fn delete_section(&self, id: ProfileSectionId) -> Result<()>;

    // Members
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Member whose attribute `member_field` equals `value`, ignoring case
    async fn find_member_by_attribute(&self, member_field: &str, value: &str)
        -> Result<Option<Member>>;

    async fn insert_member(&self, member: &Member) -> Result<Member>;

    /// Members in any of `groups` (all members when empty) plus the total count
    async fn members_for_listing(
        &self,
        groups: &[GroupId],
        window: ListingWindow,
    ) -> Result<(Vec<Member>, i64)>;

    async fn member_in_groups(&self, id: MemberId, groups: &[GroupId]) -> Result<bool>;

    /// Returns the committed before/after values, `None` for unknown members
    async fn set_needs_validation(
        &self,
        id: MemberId,
        value: bool,
    ) -> Result<Option<FieldChange<bool>>>;

    /// Returns the committed before/after values, `None` for unknown members
    async fn set_needs_approval(&self, id: MemberId, value: bool)
        -> Result<Option<FieldChange<bool>>>;

    async fn set_public_fields(&self, id: MemberId, selections: &PublicFieldSelections)
        -> Result<()>;
}
