//! Authorization for profile operations.
//!
//! Capability checks for administrative actions:
//!
//! ```ignore
//! use crate::common::auth::{Actor, SiteCapability};
//!
//! actor.can(SiteCapability::ManageMembers).check(deps)?;
//! ```
//!
//! and inherited-permission checks for profile fields and sections through
//! [`ProfileAccessGuard`].

mod builder;
mod capability;
mod errors;
mod guard;

pub use builder::{Actor, CapabilityBuilder, HasAuthContext};
pub use capability::SiteCapability;
pub use errors::AuthError;
pub use guard::{
    default_policy, AccessAction, AccessContext, AccessExtension, AccessRequest, PageOwned,
    ProfileAccessGuard, Verdict,
};
