//! Administration routes for members, field rules and profile sections

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::{optional_actor, require_actor, ApiError, ApiResult};
use crate::common::{MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
use crate::domains::member::activities::{
    apply_manual_email_validation, approve_member, resend_confirmation, set_needs_approval,
    ManualEmailValidation,
};
use crate::domains::member::FieldChange;
use crate::domains::profile_fields::activities::{
    create_field, delete_field, list_field_summaries, update_field,
};
use crate::domains::profile_fields::{FieldSettings, FieldSummary, NewProfileField, ProfileField};
use crate::domains::profile_sections::activities::{create_section, delete_section, rename_section};
use crate::domains::profile_sections::{NewProfileSection, ProfileSection};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

// =============================================================================
// Members
// =============================================================================

pub async fn approve_member_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<FieldChange<bool>> {
    let actor = require_actor(&user)?;
    Ok(Json(approve_member(member_id, &actor, &state.deps).await?))
}

#[derive(Debug, Deserialize)]
pub struct NeedsApprovalRequest {
    pub needs_approval: bool,
}

pub async fn set_needs_approval_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
    Json(request): Json<NeedsApprovalRequest>,
) -> ApiResult<FieldChange<bool>> {
    let actor = require_actor(&user)?;
    Ok(Json(
        set_needs_approval(member_id, request.needs_approval, &actor, &state.deps).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct EmailValidationRequest {
    #[serde(default)]
    pub choice: ManualEmailValidation,
}

pub async fn email_validation_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
    Json(request): Json<EmailValidationRequest>,
) -> Result<StatusCode, ApiError> {
    let actor = require_actor(&user)?;
    apply_manual_email_validation(member_id, request.choice, &actor, &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ResendResponse {
    pub sent: bool,
}

pub async fn resend_confirmation_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<ResendResponse> {
    let actor = require_actor(&user)?;
    let sent = resend_confirmation(member_id, &actor, &state.deps).await?;
    Ok(Json(ResendResponse { sent }))
}

// =============================================================================
// Field rules
// =============================================================================

pub async fn list_fields_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(page_id): Path<ProfilePageId>,
) -> ApiResult<Vec<FieldSummary>> {
    let actor = optional_actor(&user);
    Ok(Json(
        list_field_summaries(page_id, actor.as_ref(), &state.deps).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateFieldRequest {
    pub member_field: String,
    #[serde(default)]
    pub settings: FieldSettings,
    pub sort_order: Option<i32>,
}

pub async fn create_field_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(page_id): Path<ProfilePageId>,
    Json(request): Json<CreateFieldRequest>,
) -> ApiResult<ProfileField> {
    let actor = optional_actor(&user);
    let mut new = NewProfileField::new(page_id, request.member_field).with_settings(request.settings);
    new.sort_order = request.sort_order;
    Ok(Json(create_field(new, actor.as_ref(), &state.deps).await?))
}

pub async fn update_field_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(field_id): Path<ProfileFieldId>,
    Json(settings): Json<FieldSettings>,
) -> ApiResult<ProfileField> {
    let actor = optional_actor(&user);
    Ok(Json(
        update_field(field_id, settings, actor.as_ref(), &state.deps).await?,
    ))
}

pub async fn delete_field_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(field_id): Path<ProfileFieldId>,
) -> Result<StatusCode, ApiError> {
    let actor = optional_actor(&user);
    delete_field(field_id, actor.as_ref(), &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SectionTitleRequest {
    pub custom_title: Option<String>,
}

pub async fn create_section_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(page_id): Path<ProfilePageId>,
    request: Option<Json<SectionTitleRequest>>,
) -> ApiResult<ProfileSection> {
    let actor = optional_actor(&user);
    let mut new = NewProfileSection::fields_list(page_id);
    new.custom_title = request.and_then(|Json(request)| request.custom_title);
    Ok(Json(create_section(new, actor.as_ref(), &state.deps).await?))
}

pub async fn rename_section_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(section_id): Path<ProfileSectionId>,
    Json(request): Json<SectionTitleRequest>,
) -> ApiResult<ProfileSection> {
    let actor = optional_actor(&user);
    Ok(Json(
        rename_section(section_id, request.custom_title, actor.as_ref(), &state.deps).await?,
    ))
}

pub async fn delete_section_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(section_id): Path<ProfileSectionId>,
) -> Result<StatusCode, ApiError> {
    let actor = optional_actor(&user);
    delete_section(section_id, actor.as_ref(), &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
