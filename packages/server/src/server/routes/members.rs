//! Public and member-facing profile routes

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::{optional_actor, require_actor, ApiResult};
use crate::common::auth::Actor;
use crate::common::{MemberId, ProfilePageId};
use crate::domains::listing::activities::{
    list_members, view_member, MemberListing, MemberProfileView,
};
use crate::domains::member::activities::{
    account_status, check_login, confirm_with_token, register_member, update_public_fields,
    Registration,
};
use crate::domains::member::{AccountStatus, PublicFieldSelections};
use crate::domains::profile_fields::activities::form_plan;
use crate::domains::profile_fields::{FormContext, FormFieldPlan};
use crate::kernel::ListingWindow;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListingQuery {
    fn window(&self) -> ListingWindow {
        let default = ListingWindow::default();
        ListingWindow {
            offset: self.offset.unwrap_or(default.offset).max(0),
            limit: self.limit.unwrap_or(default.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

pub async fn list_members_handler(
    Extension(state): Extension<AppState>,
    Path(page_id): Path<ProfilePageId>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<MemberListing> {
    Ok(Json(list_members(page_id, query.window(), &state.deps).await?))
}

pub async fn view_member_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path((page_id, member_id)): Path<(ProfilePageId, MemberId)>,
) -> ApiResult<MemberProfileView> {
    let viewer = optional_actor(&user);
    Ok(Json(
        view_member(page_id, member_id, viewer.as_ref(), &state.deps).await?,
    ))
}

pub async fn form_plan_handler(
    Extension(state): Extension<AppState>,
    Path((page_id, context)): Path<(ProfilePageId, FormContext)>,
) -> ApiResult<Vec<FormFieldPlan>> {
    Ok(Json(form_plan(page_id, context, &state.deps).await?))
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member_id: MemberId,
    pub status: AccountStatus,
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Path(page_id): Path<ProfilePageId>,
    Json(registration): Json<Registration>,
) -> ApiResult<MemberResponse> {
    let member = register_member(page_id, registration, &state.deps).await?;
    Ok(Json(MemberResponse {
        member_id: member.id,
        status: member.state.status(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginCheckRequest {
    /// Value of the configured identifier field
    pub identifier: String,
}

#[derive(Debug, Serialize)]
pub struct LoginCheckResponse {
    pub status: AccountStatus,
}

pub async fn login_check_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<LoginCheckRequest>,
) -> ApiResult<LoginCheckResponse> {
    let member = check_login(&request.identifier, &state.deps).await?;
    Ok(Json(LoginCheckResponse {
        status: member.state.status(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

pub async fn validate_email_handler(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<MemberId>,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<AccountStatus> {
    confirm_with_token(member_id, &request.token, &state.deps).await?;
    let actor = Actor::new(member_id, false);
    Ok(Json(account_status(member_id, &actor, &state.deps).await?))
}

pub async fn status_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<AccountStatus> {
    let actor = require_actor(&user)?;
    Ok(Json(account_status(member_id, &actor, &state.deps).await?))
}

#[derive(Debug, Deserialize)]
pub struct PublicFieldsRequest {
    pub fields: Vec<String>,
}

pub async fn update_public_fields_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
    Json(request): Json<PublicFieldsRequest>,
) -> ApiResult<PublicFieldSelections> {
    let actor = require_actor(&user)?;
    Ok(Json(
        update_public_fields(member_id, request.fields, &actor, &state.deps).await?,
    ))
}
