// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;

pub use auth::{AccessAction, AccessContext, Actor, AuthError, HasAuthContext, SiteCapability};
pub use entity_ids::{GroupId, MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
pub use errors::{ConfigurationError, ProfileError, ProfileResult};
pub use id::Id;
