use tracing::{info, warn};

use crate::common::auth::{Actor, AuthError, SiteCapability};
use crate::common::{MemberId, ProfileError, ProfileResult};
use crate::domains::member::{AccountStatus, Member, PublicFieldSelections};
use crate::kernel::ServerDeps;

/// Replace the member's public-field opt-ins.
///
/// Members manage their own selections; member managers may change anyone's.
/// Only MemberChoice fields of the member's profile page are accepted.
pub async fn update_public_fields(
    member_id: MemberId,
    requested: Vec<String>,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<PublicFieldSelections> {
    if !actor.is_member(member_id) {
        actor.can(SiteCapability::ManageMembers).check(deps)?;
    }

    let member = deps
        .store
        .find_member(member_id)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;
    let fields = match member.profile_page_id {
        Some(page_id) => deps.store.fields_for_page(page_id).await?,
        None => Vec::new(),
    };

    let selections = PublicFieldSelections::validated(requested, &fields, &deps.resolver)?;
    deps.store.set_public_fields(member_id, &selections).await?;
    info!(member_id = %member_id, count = selections.len(), "Public fields updated");
    Ok(selections)
}

/// Authentication gate: the account must be neither awaiting approval nor
/// awaiting email validation. Every reason is reported at once.
///
/// `account` is matched against the configured identifier field.
pub async fn check_login(account: &str, deps: &ServerDeps) -> ProfileResult<Member> {
    let identifier = deps.resolver.system().identifier_field();
    let member = deps
        .store
        .find_member_by_attribute(identifier, account.trim())
        .await?
        .ok_or(ProfileError::UnknownAccount)?;

    if let Err(blocked) = member.state.can_log_in() {
        warn!(member_id = %member.id, reasons = ?blocked.reasons(), "Login blocked");
        return Err(blocked.into());
    }
    Ok(member)
}

/// Account status of a member, visible to the member and member managers.
pub async fn account_status(
    member_id: MemberId,
    actor: &Actor,
    deps: &ServerDeps,
) -> ProfileResult<AccountStatus> {
    let permitted = actor.is_member(member_id)
        || deps
            .permissions
            .has_capability(actor, SiteCapability::ManageMembers);
    if !permitted {
        return Err(AuthError::PermissionDenied(
            "cannot view another member's status".to_string(),
        )
        .into());
    }

    let member = deps
        .store
        .find_member(member_id)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;
    Ok(member.state.status())
}
