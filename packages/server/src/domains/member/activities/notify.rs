use tracing::{error, info};

use crate::domains::member::Member;
use crate::domains::profile_pages::ProfilePage;
use crate::kernel::ServerDeps;

/// Dispatch the page's confirmation email.
///
/// Failures are logged and reported as `false`; the caller's committed
/// state change stands.
pub(crate) async fn dispatch_confirmation(
    page: &ProfilePage,
    member: &Member,
    deps: &ServerDeps,
) -> bool {
    match deps.mailer.send(page, member).await {
        Ok(()) => {
            info!(member_id = %member.id, page_id = %page.id, "Confirmation sent");
            true
        }
        Err(e) => {
            error!(
                member_id = %member.id,
                page_id = %page.id,
                error = %e,
                "Failed to send confirmation"
            );
            false
        }
    }
}

/// The page a member registered through, if it still exists.
pub(crate) async fn owning_page(
    member: &Member,
    deps: &ServerDeps,
) -> anyhow::Result<Option<ProfilePage>> {
    match member.profile_page_id {
        Some(page_id) => deps.store.find_page(page_id).await,
        None => Ok(None),
    }
}
