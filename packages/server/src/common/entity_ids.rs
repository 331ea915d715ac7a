//! Typed ID definitions for the profile entities.

pub use super::id::Id;

/// Marker type for member accounts.
pub struct Member;

/// Marker type for profile pages (the owner of fields and sections).
pub struct ProfilePage;

/// Marker type for per-field visibility rules.
pub struct ProfileField;

/// Marker type for profile page sections.
pub struct ProfileSection;

/// Marker type for member groups used to restrict listings.
pub struct Group;

pub type MemberId = Id<Member>;
pub type ProfilePageId = Id<ProfilePage>;
pub type ProfileFieldId = Id<ProfileField>;
pub type ProfileSectionId = Id<ProfileSection>;
pub type GroupId = Id<Group>;
