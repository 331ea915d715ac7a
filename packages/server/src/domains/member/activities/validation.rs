//! Email validation: token confirmation, manual confirmation and resends

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::notify::{dispatch_confirmation, owning_page};
use crate::common::auth::{Actor, SiteCapability};
use crate::common::{MemberId, ProfileError, ProfileResult};
use crate::domains::member::Member;
use crate::kernel::ServerDeps;

/// Administrator's choice on the member's "manual email validation" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManualEmailValidation {
    /// Mark the email address as validated
    Confirm,
    /// Send the validation email again
    Resend,
    /// Leave the member as is
    #[default]
    Unconfirmed,
}

async fn load_member(member_id: MemberId, deps: &ServerDeps) -> ProfileResult<Member> {
    deps.store
        .find_member(member_id)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))
}

async fn clear_needs_validation(member_id: MemberId, deps: &ServerDeps) -> ProfileResult<()> {
    deps.store
        .set_needs_validation(member_id, false)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;
    info!(member_id = %member_id, "Member email validated");
    Ok(())
}

/// Mark the member's email as validated. Sends nothing.
pub async fn confirm_member(
    member_id: MemberId,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<()> {
    actor.can(SiteCapability::ManageMembers).check(deps)?;
    clear_needs_validation(member_id, deps).await
}

/// Validate through the emailed link.
///
/// The token stays valid afterwards, so following the link again succeeds.
pub async fn confirm_with_token(
    member_id: MemberId,
    token: &str,
    deps: &ServerDeps,
) -> ProfileResult<()> {
    let member = load_member(member_id, deps).await?;
    if !member.state.token_matches(token) {
        warn!(member_id = %member_id, "Validation token mismatch");
        return Err(ProfileError::InvalidValidationToken);
    }
    clear_needs_validation(member_id, deps).await
}

/// Send the owning page's email to the member again, whether or not the
/// member is still awaiting validation. Returns whether an email went out.
pub async fn resend_confirmation(
    member_id: MemberId,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<bool> {
    actor.can(SiteCapability::ManageMembers).check(deps)?;

    let member = load_member(member_id, deps).await?;
    match owning_page(&member, deps).await? {
        Some(page) if page.email_type.sends_email() => {
            Ok(dispatch_confirmation(&page, &member, deps).await)
        }
        _ => {
            debug!(member_id = %member_id, "Owning page sends no email");
            Ok(false)
        }
    }
}

pub async fn apply_manual_email_validation(
    member_id: MemberId,
    choice: ManualEmailValidation,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<()> {
    match choice {
        ManualEmailValidation::Confirm => confirm_member(member_id, actor, deps).await,
        ManualEmailValidation::Resend => resend_confirmation(member_id, actor, deps)
            .await
            .map(|_| ()),
        ManualEmailValidation::Unconfirmed => {
            actor.can(SiteCapability::ManageMembers).check(deps)?;
            Ok(())
        }
    }
}
