//! Confirmation mailer that records dispatches in the log.
//!
//! Email templating and transport belong to the host; this adapter is the
//! default until one is wired in.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::BaseConfirmationMailer;
use crate::domains::member::Member;
use crate::domains::profile_pages::ProfilePage;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMailer;

#[async_trait]
impl BaseConfirmationMailer for LoggingMailer {
    async fn send(&self, page: &ProfilePage, member: &Member) -> Result<()> {
        info!(
            page_id = %page.id,
            member_id = %member.id,
            email_type = ?page.email_type,
            "Confirmation email dispatched"
        );
        Ok(())
    }
}
