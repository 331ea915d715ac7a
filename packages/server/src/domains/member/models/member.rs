use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;

use crate::common::{GroupId, MemberId, ProfilePageId};
use crate::domains::member::public_fields::PublicFieldSelections;
use crate::domains::member::state::{FieldChange, MemberState};

/// Member attributes that live in their own column. Everything else a
/// profile page collects is kept in `attributes`.
pub const STORED_COLUMNS: [&str; 4] = ["Email", "FirstName", "Surname", "Locale"];

/// Member model - SQL persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: MemberId,
    /// Profile page the member registered through
    pub profile_page_id: Option<ProfilePageId>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub locale: Option<String>,
    pub attributes: Json<BTreeMap<String, String>>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub state: MemberState,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(email: impl Into<String>, state: MemberState) -> Self {
        let mut member = Self::with_state(state);
        member.email = Some(email.into());
        member
    }

    /// A member with no attributes set yet.
    pub fn with_state(state: MemberState) -> Self {
        Self {
            id: MemberId::new(),
            profile_page_id: None,
            email: None,
            first_name: None,
            surname: None,
            locale: None,
            attributes: Json(BTreeMap::new()),
            state,
            created_at: Utc::now(),
        }
    }

    /// "First Surname", falling back to the email address.
    pub fn name(&self) -> String {
        let name = [self.first_name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name
        }
    }

    /// Value of a member attribute by its form name.
    pub fn attribute(&self, member_field: &str) -> Option<String> {
        match member_field {
            "Email" => self.email.clone(),
            "FirstName" => self.first_name.clone(),
            "Surname" => self.surname.clone(),
            "Locale" => self.locale.clone(),
            other => self.attributes.get(other).cloned(),
        }
    }

    /// Store a submitted value under its form name. Unknown names go into
    /// the free-form attribute map.
    pub fn set_attribute(&mut self, member_field: &str, value: String) {
        match member_field {
            "Email" => self.email = Some(value),
            "FirstName" => self.first_name = Some(value),
            "Surname" => self.surname = Some(value),
            "Locale" => self.locale = Some(value),
            other => {
                self.attributes.insert(other.to_string(), value);
            }
        }
    }

    pub fn has_stored_column(member_field: &str) -> bool {
        STORED_COLUMNS.contains(&member_field)
    }

    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Member whose attribute equals `value`, ignoring case.
    pub async fn find_by_attribute(
        member_field: &str,
        value: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let column = match member_field {
            "Email" => "email",
            "FirstName" => "first_name",
            "Surname" => "surname",
            "Locale" => "locale",
            other => {
                return sqlx::query_as::<_, Self>(
                    "SELECT * FROM members WHERE lower(attributes ->> $1) = lower($2) LIMIT 1",
                )
                .bind(other)
                .bind(value)
                .fetch_optional(pool)
                .await
                .map_err(Into::into);
            }
        };

        let sql = format!("SELECT * FROM members WHERE lower({column}) = lower($1) LIMIT 1");
        sqlx::query_as::<_, Self>(&sql)
            .bind(value)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO members (
                id,
                profile_page_id,
                email,
                first_name,
                surname,
                locale,
                attributes,
                needs_validation,
                needs_approval,
                validation_key,
                public_fields
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *",
        )
        .bind(self.id)
        .bind(self.profile_page_id)
        .bind(&self.email)
        .bind(&self.first_name)
        .bind(&self.surname)
        .bind(&self.locale)
        .bind(&self.attributes)
        .bind(self.state.needs_validation)
        .bind(self.state.needs_approval)
        .bind(&self.state.validation_token)
        .bind(&self.state.public_fields)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Members shown on a listing, in registration order.
    ///
    /// An empty `groups` slice lists every member.
    pub async fn find_for_listing(
        groups: &[GroupId],
        offset: i64,
        limit: i64,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64)> {
        let members = sqlx::query_as::<_, Self>(
            "SELECT m.* FROM members m
             WHERE cardinality($1::uuid[]) = 0
                OR EXISTS (
                    SELECT 1 FROM member_groups mg
                    WHERE mg.member_id = m.id AND mg.group_id = ANY($1)
                )
             ORDER BY m.created_at, m.id
             OFFSET $2 LIMIT $3",
        )
        .bind(groups)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM members m
             WHERE cardinality($1::uuid[]) = 0
                OR EXISTS (
                    SELECT 1 FROM member_groups mg
                    WHERE mg.member_id = m.id AND mg.group_id = ANY($1)
                )",
        )
        .bind(groups)
        .fetch_one(pool)
        .await?;

        Ok((members, total.0))
    }

    pub async fn is_in_any_group(id: MemberId, groups: &[GroupId], pool: &PgPool) -> Result<bool> {
        let found: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM member_groups WHERE member_id = $1 AND group_id = ANY($2)
             )",
        )
        .bind(id)
        .bind(groups)
        .fetch_one(pool)
        .await?;
        Ok(found.0)
    }

    pub async fn add_to_group(id: MemberId, group_id: GroupId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO member_groups (member_id, group_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(group_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set `needs_validation`, returning the committed before/after values.
    pub async fn set_needs_validation(
        id: MemberId,
        value: bool,
        pool: &PgPool,
    ) -> Result<Option<FieldChange<bool>>> {
        let row: Option<(bool, bool)> = sqlx::query_as(
            "UPDATE members m SET needs_validation = $2
             FROM (SELECT id, needs_validation FROM members WHERE id = $1 FOR UPDATE) old
             WHERE m.id = old.id
             RETURNING old.needs_validation, m.needs_validation",
        )
        .bind(id)
        .bind(value)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(before, after)| FieldChange { before, after }))
    }

    /// Set `needs_approval`, returning the committed before/after values.
    pub async fn set_needs_approval(
        id: MemberId,
        value: bool,
        pool: &PgPool,
    ) -> Result<Option<FieldChange<bool>>> {
        let row: Option<(bool, bool)> = sqlx::query_as(
            "UPDATE members m SET needs_approval = $2
             FROM (SELECT id, needs_approval FROM members WHERE id = $1 FOR UPDATE) old
             WHERE m.id = old.id
             RETURNING old.needs_approval, m.needs_approval",
        )
        .bind(id)
        .bind(value)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(before, after)| FieldChange { before, after }))
    }

    pub async fn set_public_fields(
        id: MemberId,
        selections: &PublicFieldSelections,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query("UPDATE members SET public_fields = $2 WHERE id = $1")
            .bind(id)
            .bind(selections)
            .execute(pool)
            .await?;
        Ok(())
    }
}
