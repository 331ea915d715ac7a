use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::auth::{Actor, AuthError};
use crate::common::ProfileError;
use crate::server::middleware::AuthUser;

/// `ProfileError` as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub ProfileError);

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        ApiError(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reasons: Vec<String>,
}

pub fn status_for(err: &ProfileError) -> StatusCode {
    match err {
        ProfileError::Configuration(_) => StatusCode::BAD_REQUEST,
        ProfileError::Auth(AuthError::AuthenticationRequired | AuthError::InvalidToken) => {
            StatusCode::UNAUTHORIZED
        }
        ProfileError::Auth(_) => StatusCode::FORBIDDEN,
        ProfileError::AuthenticationBlocked(_) => StatusCode::FORBIDDEN,
        ProfileError::UnknownAccount => StatusCode::UNAUTHORIZED,
        ProfileError::PageNotFound(_)
        | ProfileError::MemberNotFound(_)
        | ProfileError::FieldNotFound(_)
        | ProfileError::SectionNotFound(_) => StatusCode::NOT_FOUND,
        ProfileError::MemberNotListed(_) => StatusCode::FORBIDDEN,
        ProfileError::NotMemberChoice(_) | ProfileError::MissingRequiredField(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProfileError::InvalidValidationToken => StatusCode::BAD_REQUEST,
        ProfileError::IdentifierTaken(_) | ProfileError::DuplicateValue(_) => StatusCode::CONFLICT,
        ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = match &self.0 {
            ProfileError::Internal(e) => {
                error!(error = %e, "Request failed");
                ErrorBody {
                    error: "Internal server error".to_string(),
                    reasons: Vec::new(),
                }
            }
            ProfileError::AuthenticationBlocked(blocked) => ErrorBody {
                error: "Login blocked".to_string(),
                reasons: blocked.reasons().iter().map(ToString::to_string).collect(),
            },
            other => ErrorBody {
                error: other.to_string(),
                reasons: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn optional_actor(user: &Option<Extension<AuthUser>>) -> Option<Actor> {
    user.as_ref().map(|Extension(user)| user.actor())
}

pub fn require_actor(user: &Option<Extension<AuthUser>>) -> Result<Actor, ApiError> {
    optional_actor(user).ok_or_else(|| AuthError::AuthenticationRequired.into())
}
