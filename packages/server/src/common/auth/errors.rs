use thiserror::Error;

use super::AccessAction;

/// Authorization errors for profile operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Admin access required")]
    AdminRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied: cannot {action} {resource}")]
    AccessDenied {
        action: AccessAction,
        resource: &'static str,
    },
}
