//! Permission primitives backed by the verified JWT admin flag.

use super::BasePermissionService;
use crate::common::auth::{AccessAction, Actor, SiteCapability};
use crate::domains::profile_pages::ProfilePage;

/// Admins hold every site capability. Profile pages are publicly viewable
/// and only admins may change them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsPermissionService;

impl BasePermissionService for ClaimsPermissionService {
    fn has_capability(&self, actor: &Actor, _capability: SiteCapability) -> bool {
        actor.is_admin()
    }

    fn page_permits(
        &self,
        action: AccessAction,
        actor: Option<&Actor>,
        _page: &ProfilePage,
    ) -> bool {
        match action {
            AccessAction::View => true,
            AccessAction::Edit | AccessAction::Create | AccessAction::Delete => {
                actor.is_some_and(Actor::is_admin)
            }
        }
    }
}
