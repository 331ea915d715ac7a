//! Access decisions for page-owned records (profile fields and sections).
//!
//! A decision runs an ordered list of steps until one returns a definitive
//! verdict:
//!
//! 1. registered extensions (first non-undecided verdict wins)
//! 2. the parent profile page's own permission for the same action
//! 3. the site-wide "edit all content" capability
//!
//! and falls back to [`default_policy`] when every step is undecided. Fields
//! and sections never carry permissions of their own while they have a page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{Actor, AuthError, SiteCapability};
use crate::common::entity_ids::ProfilePageId;
use crate::domains::profile_pages::ProfilePage;
use crate::kernel::BasePermissionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    View,
    Edit,
    Create,
    Delete,
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            AccessAction::View => "view",
            AccessAction::Edit => "edit",
            AccessAction::Create => "create",
            AccessAction::Delete => "delete",
        };
        f.write_str(action)
    }
}

/// Outcome of a single decision step. `Undecided` passes control to the
/// next step and is never treated as a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
    Undecided,
}

impl Verdict {
    pub fn decided(self) -> Option<bool> {
        match self {
            Verdict::Allow => Some(true),
            Verdict::Deny => Some(false),
            Verdict::Undecided => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(allowed: bool) -> Self {
        if allowed {
            Verdict::Allow
        } else {
            Verdict::Deny
        }
    }
}

impl From<Option<bool>> for Verdict {
    fn from(decision: Option<bool>) -> Self {
        decision.map(Verdict::from).unwrap_or(Verdict::Undecided)
    }
}

/// A record whose permissions are inherited from the profile page owning it.
pub trait PageOwned {
    /// Resource name used in logs and denial messages.
    const RESOURCE: &'static str;

    fn parent_page_id(&self) -> Option<ProfilePageId>;
}

/// Free-form context passed through to extensions (e.g. the intended parent
/// of a record being created).
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    pub attributes: BTreeMap<String, String>,
}

impl AccessContext {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

pub struct AccessRequest<'a> {
    pub action: AccessAction,
    pub actor: Option<&'a Actor>,
    pub resource: &'static str,
    /// The resource's parent page, present only if it exists.
    pub parent: Option<&'a ProfilePage>,
    pub context: &'a AccessContext,
}

/// Third-party override hook. Return `Undecided` to defer to the built-in
/// steps.
pub trait AccessExtension: Send + Sync {
    fn decide(&self, request: &AccessRequest<'_>) -> Verdict;
}

type DecisionStep = fn(&ProfileAccessGuard<'_>, &AccessRequest<'_>) -> Verdict;

const DECISION_STEPS: [DecisionStep; 3] =
    [extension_verdict, parent_page_verdict, site_wide_verdict];

/// Base permission policy used when no step decides: admins only.
pub fn default_policy(actor: Option<&Actor>) -> bool {
    actor.is_some_and(Actor::is_admin)
}

pub struct ProfileAccessGuard<'a> {
    extensions: &'a [Arc<dyn AccessExtension>],
    permissions: &'a dyn BasePermissionService,
}

impl<'a> ProfileAccessGuard<'a> {
    pub fn new(
        extensions: &'a [Arc<dyn AccessExtension>],
        permissions: &'a dyn BasePermissionService,
    ) -> Self {
        Self {
            extensions,
            permissions,
        }
    }

    /// Decide whether `actor` may perform `action` on `resource`.
    ///
    /// `parent` is the resolved parent page; it is ignored unless it is the
    /// page the resource points at.
    pub fn check<R: PageOwned>(
        &self,
        action: AccessAction,
        actor: Option<&Actor>,
        resource: &R,
        parent: Option<&ProfilePage>,
        context: &AccessContext,
    ) -> bool {
        let parent_id = resource.parent_page_id();
        let request = AccessRequest {
            action,
            actor,
            resource: R::RESOURCE,
            parent: parent.filter(|page| Some(page.id) == parent_id),
            context,
        };
        self.decide(&request)
    }

    /// Same as [`check`](Self::check), mapping a denial to `AuthError::AccessDenied`.
    pub fn ensure<R: PageOwned>(
        &self,
        action: AccessAction,
        actor: Option<&Actor>,
        resource: &R,
        parent: Option<&ProfilePage>,
        context: &AccessContext,
    ) -> Result<(), AuthError> {
        if self.check(action, actor, resource, parent, context) {
            Ok(())
        } else {
            Err(AuthError::AccessDenied {
                action,
                resource: R::RESOURCE,
            })
        }
    }

    pub fn decide(&self, request: &AccessRequest<'_>) -> bool {
        let allowed = DECISION_STEPS
            .iter()
            .find_map(|step| step(self, request).decided())
            .unwrap_or_else(|| default_policy(request.actor));

        debug!(
            action = %request.action,
            resource = request.resource,
            allowed,
            "Profile access decision"
        );
        allowed
    }
}

fn extension_verdict(guard: &ProfileAccessGuard<'_>, request: &AccessRequest<'_>) -> Verdict {
    guard
        .extensions
        .iter()
        .map(|extension| extension.decide(request))
        .find(|verdict| *verdict != Verdict::Undecided)
        .unwrap_or(Verdict::Undecided)
}

fn parent_page_verdict(guard: &ProfileAccessGuard<'_>, request: &AccessRequest<'_>) -> Verdict {
    match request.parent {
        Some(page) => guard
            .permissions
            .page_permits(request.action, request.actor, page)
            .into(),
        None => Verdict::Undecided,
    }
}

fn site_wide_verdict(guard: &ProfileAccessGuard<'_>, request: &AccessRequest<'_>) -> Verdict {
    match request.actor {
        Some(actor)
            if guard
                .permissions
                .has_capability(actor, SiteCapability::EditAllContent) =>
        {
            Verdict::Allow
        }
        _ => Verdict::Undecided,
    }
}
