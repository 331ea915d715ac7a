use serde::{Deserialize, Serialize};

use super::{AuthError, SiteCapability};
use crate::common::entity_ids::MemberId;
use crate::kernel::BasePermissionService;

/// The authenticated member performing a request.
///
/// Usage:
/// ```ignore
/// Actor::new(member_id, is_admin)
///     .can(SiteCapability::ManageMembers)
///     .check(deps)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    member_id: MemberId,
    is_admin: bool,
}

impl Actor {
    /// # Arguments
    /// * `member_id` - The member ID of the actor
    /// * `is_admin` - Admin flag from the verified JWT
    pub fn new(member_id: MemberId, is_admin: bool) -> Self {
        Self { member_id, is_admin }
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether this actor is the member identified by `member_id`.
    pub fn is_member(&self, member_id: MemberId) -> bool {
        self.member_id == member_id
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: SiteCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: SiteCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check<D>(self, deps: &D) -> Result<(), AuthError>
    where
        D: HasAuthContext + ?Sized,
    {
        if deps.permissions().has_capability(&self.actor, self.capability) {
            return Ok(());
        }

        match self.capability {
            SiteCapability::FullAdmin => Err(AuthError::AdminRequired),
            other => Err(AuthError::PermissionDenied(format!(
                "{:?} capability required",
                other
            ))),
        }
    }
}

/// Trait for dependencies that can perform auth checks
pub trait HasAuthContext: Send + Sync {
    fn permissions(&self) -> &dyn BasePermissionService;
}
