//! Administrator approval of member accounts

use tracing::{debug, info};

use super::notify::{dispatch_confirmation, owning_page};
use crate::common::auth::{Actor, SiteCapability};
use crate::common::{MemberId, ProfileError, ProfileResult};
use crate::domains::member::state::{approval_notice_due, FieldChange};
use crate::kernel::ServerDeps;

/// Set or clear `needs_approval`.
///
/// Clearing a flag that was set sends the page's confirmation email, unless
/// the page sends no email. Repeating an approval or revoking one never
/// sends anything.
pub async fn set_needs_approval(
    member_id: MemberId,
    needs_approval: bool,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<FieldChange<bool>> {
    actor.can(SiteCapability::ManageMembers).check(deps)?;

    let change = deps
        .store
        .set_needs_approval(member_id, needs_approval)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;
    info!(
        member_id = %member_id,
        before = change.before,
        after = change.after,
        "Member approval flag updated"
    );

    if !change.is_release() {
        return Ok(change);
    }

    let member = deps
        .store
        .find_member(member_id)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;
    match owning_page(&member, deps).await? {
        Some(page) if approval_notice_due(change, page.email_type) => {
            dispatch_confirmation(&page, &member, deps).await;
        }
        _ => debug!(member_id = %member_id, "No approval notice for this page"),
    }

    Ok(change)
}

pub async fn approve_member(
    member_id: MemberId,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<FieldChange<bool>> {
    set_needs_approval(member_id, false, actor, deps).await
}
