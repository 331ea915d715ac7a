use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::common::auth::PageOwned;
use crate::common::{ProfilePageId, ProfileSectionId};

/// The closed set of section types a profile page can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "section_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// The viewed member's publicly visible profile fields
    FieldsList,
}

impl SectionKind {
    pub fn default_title(&self) -> &'static str {
        match self {
            SectionKind::FieldsList => "Profile Fields List",
        }
    }

    /// Whether the title is rendered above the section content.
    pub fn show_title(&self) -> bool {
        match self {
            SectionKind::FieldsList => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfileSection {
    pub parent_id: Option<ProfilePageId>,
    pub kind: SectionKind,
    pub custom_title: Option<String>,
    /// Explicit position; unset appends after the page's last section.
    pub sort_order: Option<i32>,
}

impl NewProfileSection {
    pub fn fields_list(parent_id: ProfilePageId) -> Self {
        Self {
            parent_id: Some(parent_id),
            kind: SectionKind::FieldsList,
            custom_title: None,
            sort_order: None,
        }
    }
}

impl PageOwned for NewProfileSection {
    const RESOURCE: &'static str = "profile section";

    fn parent_page_id(&self) -> Option<ProfilePageId> {
        self.parent_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileSection {
    pub id: ProfileSectionId,
    pub parent_id: Option<ProfilePageId>,
    pub kind: SectionKind,
    pub custom_title: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl PageOwned for ProfileSection {
    const RESOURCE: &'static str = "profile section";

    fn parent_page_id(&self) -> Option<ProfilePageId> {
        self.parent_id
    }
}

impl ProfileSection {
    pub fn from_new(new: NewProfileSection, sort_order: i32) -> Self {
        Self {
            id: ProfileSectionId::new(),
            parent_id: new.parent_id,
            kind: new.kind,
            custom_title: new.custom_title.filter(|t| !t.is_empty()),
            sort_order,
            created_at: Utc::now(),
        }
    }

    pub fn title(&self) -> &str {
        self.custom_title
            .as_deref()
            .unwrap_or_else(|| self.kind.default_title())
    }

    pub async fn find_by_id(id: ProfileSectionId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profile_sections WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_page(page_id: ProfilePageId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM profile_sections
             WHERE parent_id = $1
             ORDER BY sort_order, created_at, id",
        )
        .bind(page_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create(new: NewProfileSection, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let max: (Option<i32>,) = sqlx::query_as(
            "SELECT MAX(sort_order) FROM profile_sections WHERE parent_id IS NOT DISTINCT FROM $1",
        )
        .bind(new.parent_id)
        .fetch_one(&mut *tx)
        .await?;
        let sort_order = match new.sort_order {
            Some(sort) if sort != 0 => sort,
            _ => max.0.unwrap_or(0) + 1,
        };
        let section = Self::from_new(new, sort_order);

        let created = sqlx::query_as::<_, Self>(
            "INSERT INTO profile_sections (id, parent_id, kind, custom_title, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(section.id)
        .bind(section.parent_id)
        .bind(section.kind)
        .bind(&section.custom_title)
        .bind(section.sort_order)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn rename(
        id: ProfileSectionId,
        custom_title: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE profile_sections SET custom_title = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(custom_title.filter(|t| !t.is_empty()))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: ProfileSectionId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM profile_sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
