use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::{GroupId, MemberId, ProfilePageId};

/// Which email a profile page sends when an account is registered or
/// approved. `None` suppresses all confirmation notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Member must follow the emailed link before logging in
    Validation,
    /// Informational email only
    Confirmation,
    #[default]
    None,
}

impl NotificationType {
    pub fn sends_email(&self) -> bool {
        !matches!(self, NotificationType::None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfilePage {
    pub id: ProfilePageId,
    pub title: String,
    pub url_segment: String,
    pub email_type: NotificationType,
    pub requires_approval: bool,
    pub created_at: DateTime<Utc>,
}

impl ProfilePage {
    pub fn link(&self) -> String {
        format!("/{}", self.url_segment.trim_matches('/'))
    }

    /// Public profile link for a member shown through this page.
    pub fn member_link(&self, member_id: MemberId) -> String {
        format!("{}/profile/{}", self.link(), member_id)
    }

    pub async fn find_by_id(id: ProfilePageId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profile_pages WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(
        title: &str,
        url_segment: &str,
        email_type: NotificationType,
        requires_approval: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO profile_pages (id, title, url_segment, email_type, requires_approval)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(ProfilePageId::new())
        .bind(title)
        .bind(url_segment)
        .bind(email_type)
        .bind(requires_approval)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Groups a member must belong to in order to be listed on this page.
    /// Empty means every member is listed.
    pub async fn group_ids(id: ProfilePageId, pool: &PgPool) -> Result<Vec<GroupId>> {
        let rows: Vec<(GroupId,)> = sqlx::query_as(
            "SELECT group_id FROM profile_page_groups WHERE profile_page_id = $1",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
