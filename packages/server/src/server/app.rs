//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domains::auth::JwtService;
use crate::domains::profile_fields::{SystemFields, VisibilityResolver};
use crate::kernel::{
    ClaimsPermissionService, LoggingMailer, MemoizedFieldDefinitions, PgProfileStore, ServerDeps,
    StaticMemberForm,
};
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{admin, health_handler, members};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    /// Absent when the server runs against a non-Postgres store
    pub db_pool: Option<PgPool>,
    pub jwt_service: Arc<JwtService>,
}

/// Dependencies backed by Postgres and the built-in member form.
pub fn postgres_deps(pool: PgPool, identifier_field: &str) -> ServerDeps {
    ServerDeps::new(
        Arc::new(PgProfileStore::new(pool)),
        Arc::new(LoggingMailer),
        Arc::new(ClaimsPermissionService),
        Arc::new(MemoizedFieldDefinitions::new(StaticMemberForm::default())),
        VisibilityResolver::new(SystemFields::new(identifier_field)),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let jwt_service = state.jwt_service.clone();

    Router::new()
        .route("/health", get(health_handler))
        // Public profile pages
        .route("/pages/:page_id/members", get(members::list_members_handler))
        .route(
            "/pages/:page_id/members/:member_id",
            get(members::view_member_handler),
        )
        .route(
            "/pages/:page_id/forms/:context",
            get(members::form_plan_handler),
        )
        .route("/pages/:page_id/register", post(members::register_handler))
        .route("/login-check", post(members::login_check_handler))
        // Member self-service
        .route(
            "/members/:member_id/validate",
            post(members::validate_email_handler),
        )
        .route("/members/:member_id/status", get(members::status_handler))
        .route(
            "/members/:member_id/public-fields",
            put(members::update_public_fields_handler),
        )
        // Administration
        .route(
            "/admin/members/:member_id/approve",
            post(admin::approve_member_handler),
        )
        .route(
            "/admin/members/:member_id/needs-approval",
            put(admin::set_needs_approval_handler),
        )
        .route(
            "/admin/members/:member_id/email-validation",
            put(admin::email_validation_handler),
        )
        .route(
            "/admin/members/:member_id/resend-confirmation",
            post(admin::resend_confirmation_handler),
        )
        .route(
            "/admin/pages/:page_id/fields",
            get(admin::list_fields_handler).post(admin::create_field_handler),
        )
        .route(
            "/admin/fields/:field_id",
            put(admin::update_field_handler).delete(admin::delete_field_handler),
        )
        .route(
            "/admin/pages/:page_id/sections",
            post(admin::create_section_handler),
        )
        .route(
            "/admin/sections/:section_id",
            put(admin::rename_section_handler).delete(admin::delete_section_handler),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::domains::member::{Member, MemberState};
    use crate::kernel::TestDependencies;

    fn app_with(deps: TestDependencies) -> Router {
        let state = AppState {
            deps: Arc::new(deps.into_server_deps()),
            db_pool: None,
            jwt_service: Arc::new(JwtService::new("test_secret", "test_issuer".to_string())),
        };
        build_app(state, &[])
    }

    fn test_app() -> Router {
        app_with(TestDependencies::new())
    }

    fn login_check(identifier: &str) -> Request<Body> {
        Request::post("/login-check")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "identifier": identifier }).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_without_database() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let uri = format!("/pages/{}/members", crate::common::ProfilePageId::new());
        let response = test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_requires_token() {
        let uri = format!("/members/{}/status", crate::common::MemberId::new());
        let response = test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_check_reveals_only_status() {
        let deps = TestDependencies::new();
        deps.store
            .add_member(Member::new("ada@example.org", MemberState::unrestricted()));
        let app = app_with(deps);

        let known = app.clone().oneshot(login_check("ada@example.org")).await.unwrap();
        assert_eq!(known.status(), StatusCode::OK);
        let body = body_json(known).await;
        assert_eq!(body["status"], "active");
        assert!(body.get("member_id").is_none());

        let unknown = app.oneshot(login_check("nobody@example.org")).await.unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(unknown).await;
        assert_eq!(body["error"], "Invalid credentials");
        assert!(!body.to_string().contains("nobody@example.org"));
    }
}
