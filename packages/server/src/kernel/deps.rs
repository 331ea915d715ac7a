//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. Persistence, email and permission primitives sit behind trait
//! abstractions so the activities can run against in-memory mocks.

use std::sync::Arc;

use crate::common::auth::{AccessExtension, HasAuthContext, ProfileAccessGuard};
use crate::domains::profile_fields::VisibilityResolver;
use crate::kernel::field_definitions::BaseFieldDefinitionProvider;
use crate::kernel::{BaseConfirmationMailer, BasePermissionService, BaseProfileStore};

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseProfileStore>,
    pub mailer: Arc<dyn BaseConfirmationMailer>,
    pub permissions: Arc<dyn BasePermissionService>,
    /// Memoized member form definitions (titles, widget kinds)
    pub field_definitions: Arc<dyn BaseFieldDefinitionProvider>,
    /// Access overrides consulted before any built-in permission step
    pub access_extensions: Vec<Arc<dyn AccessExtension>>,
    pub resolver: VisibilityResolver,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseProfileStore>,
        mailer: Arc<dyn BaseConfirmationMailer>,
        permissions: Arc<dyn BasePermissionService>,
        field_definitions: Arc<dyn BaseFieldDefinitionProvider>,
        resolver: VisibilityResolver,
    ) -> Self {
        Self {
            store,
            mailer,
            permissions,
            field_definitions,
            access_extensions: Vec::new(),
            resolver,
        }
    }

    pub fn with_access_extension(mut self, extension: Arc<dyn AccessExtension>) -> Self {
        self.access_extensions.push(extension);
        self
    }

    pub fn access_guard(&self) -> ProfileAccessGuard<'_> {
        ProfileAccessGuard::new(&self.access_extensions, self.permissions.as_ref())
    }
}

/// Implement HasAuthContext for ServerDeps to enable authorization checks
impl HasAuthContext for ServerDeps {
    fn permissions(&self) -> &dyn BasePermissionService {
        self.permissions.as_ref()
    }
}
