//! ProfileField model
//!
//! One row per member attribute configured on a profile page, describing how
//! the attribute behaves on the profile form, the registration form, the
//! public member listing and public profile pages.
//!
//! Sort order is assigned on insert as `MAX(sort_order) + 1` over *all*
//! profile fields, not only those of the owning page.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use typed_builder::TypedBuilder;

use crate::common::auth::PageOwned;
use crate::common::{ProfileFieldId, ProfilePageId};

/// Behaviour of a field on a member-editing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "form_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FormVisibility {
    Edit,
    Readonly,
    #[default]
    Hidden,
}

/// Behaviour of a field on public profile pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "public_visibility", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublicVisibility {
    /// Always shown
    Display,
    /// Shown only if the member opted in
    MemberChoice,
    #[default]
    Hidden,
}

/// Administrator-editable settings of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default))]
pub struct FieldSettings {
    pub profile_visibility: FormVisibility,
    pub registration_visibility: FormVisibility,
    pub member_list_visible: bool,
    pub public_visibility: PublicVisibility,
    pub public_visibility_default: bool,
    #[builder(setter(strip_option, into))]
    pub custom_title: Option<String>,
    #[builder(setter(strip_option, into))]
    pub default_value: Option<String>,
    #[builder(setter(strip_option, into))]
    pub note: Option<String>,
    #[builder(setter(strip_option, into))]
    pub custom_error: Option<String>,
    pub unique: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfileField {
    pub profile_page_id: Option<ProfilePageId>,
    pub member_field: String,
    pub settings: FieldSettings,
    /// Explicit position; `None` (or 0) appends after every existing field.
    pub sort_order: Option<i32>,
}

impl NewProfileField {
    pub fn new(profile_page_id: ProfilePageId, member_field: impl Into<String>) -> Self {
        Self {
            profile_page_id: Some(profile_page_id),
            member_field: member_field.into(),
            settings: FieldSettings::default(),
            sort_order: None,
        }
    }

    pub fn with_settings(mut self, settings: FieldSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl PageOwned for NewProfileField {
    const RESOURCE: &'static str = "profile field";

    fn parent_page_id(&self) -> Option<ProfilePageId> {
        self.profile_page_id
    }
}

/// Sort order for a new field: the requested one if set, otherwise one past
/// the current maximum.
pub fn resolve_sort_order(requested: Option<i32>, current_max: Option<i32>) -> i32 {
    match requested {
        Some(sort) if sort != 0 => sort,
        _ => current_max.unwrap_or(0) + 1,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileField {
    pub id: ProfileFieldId,
    pub profile_page_id: Option<ProfilePageId>,
    pub member_field: String,
    pub profile_visibility: FormVisibility,
    pub registration_visibility: FormVisibility,
    pub member_list_visible: bool,
    pub public_visibility: PublicVisibility,
    pub public_visibility_default: bool,
    pub custom_title: Option<String>,
    pub default_value: Option<String>,
    pub note: Option<String>,
    pub custom_error: Option<String>,
    #[sqlx(rename = "is_unique")]
    pub unique: bool,
    #[sqlx(rename = "is_required")]
    pub required: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl PageOwned for ProfileField {
    const RESOURCE: &'static str = "profile field";

    fn parent_page_id(&self) -> Option<ProfilePageId> {
        self.profile_page_id
    }
}

impl ProfileField {
    /// Build a field row from insert input without touching storage.
    pub fn from_new(new: NewProfileField, sort_order: i32) -> Self {
        let mut field = Self {
            id: ProfileFieldId::new(),
            profile_page_id: new.profile_page_id,
            member_field: new.member_field,
            profile_visibility: FormVisibility::default(),
            registration_visibility: FormVisibility::default(),
            member_list_visible: false,
            public_visibility: PublicVisibility::default(),
            public_visibility_default: false,
            custom_title: None,
            default_value: None,
            note: None,
            custom_error: None,
            unique: false,
            required: false,
            sort_order,
            created_at: Utc::now(),
        };
        field.apply(&new.settings);
        field
    }

    pub fn settings(&self) -> FieldSettings {
        FieldSettings {
            profile_visibility: self.profile_visibility,
            registration_visibility: self.registration_visibility,
            member_list_visible: self.member_list_visible,
            public_visibility: self.public_visibility,
            public_visibility_default: self.public_visibility_default,
            custom_title: self.custom_title.clone(),
            default_value: self.default_value.clone(),
            note: self.note.clone(),
            custom_error: self.custom_error.clone(),
            unique: self.unique,
            required: self.required,
        }
    }

    pub fn apply(&mut self, settings: &FieldSettings) {
        self.profile_visibility = settings.profile_visibility;
        self.registration_visibility = settings.registration_visibility;
        self.member_list_visible = settings.member_list_visible;
        self.public_visibility = settings.public_visibility;
        self.public_visibility_default = settings.public_visibility_default;
        self.custom_title = settings.custom_title.clone().filter(|t| !t.is_empty());
        self.default_value = settings.default_value.clone();
        self.note = settings.note.clone();
        self.custom_error = settings.custom_error.clone();
        self.unique = settings.unique;
        self.required = settings.required;
    }

    pub async fn find_by_id(id: ProfileFieldId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM profile_fields WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Fields of a page in display order (creation order breaks ties).
    pub async fn find_by_page(page_id: ProfilePageId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM profile_fields
             WHERE profile_page_id = $1
             ORDER BY sort_order, created_at, id",
        )
        .bind(page_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a field, assigning the next global sort order when unset.
    ///
    /// The table is locked for the duration of the transaction so two
    /// concurrent inserts never read the same maximum.
    pub async fn create(new: NewProfileField, pool: &PgPool) -> Result<Self> {
        let mut tx = pool.begin().await?;

        sqlx::query("LOCK TABLE profile_fields IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let max: (Option<i32>,) = sqlx::query_as("SELECT MAX(sort_order) FROM profile_fields")
            .fetch_one(&mut *tx)
            .await?;
        let requested = new.sort_order;
        let field = Self::from_new(new, resolve_sort_order(requested, max.0));
        let sort_order = field.sort_order;

        let created = sqlx::query_as::<_, Self>(
            "INSERT INTO profile_fields (
                id,
                profile_page_id,
                member_field,
                profile_visibility,
                registration_visibility,
                member_list_visible,
                public_visibility,
                public_visibility_default,
                custom_title,
                default_value,
                note,
                custom_error,
                is_unique,
                is_required,
                sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING *",
        )
        .bind(field.id)
        .bind(field.profile_page_id)
        .bind(&field.member_field)
        .bind(field.profile_visibility)
        .bind(field.registration_visibility)
        .bind(field.member_list_visible)
        .bind(field.public_visibility)
        .bind(field.public_visibility_default)
        .bind(&field.custom_title)
        .bind(&field.default_value)
        .bind(&field.note)
        .bind(&field.custom_error)
        .bind(field.unique)
        .bind(field.required)
        .bind(sort_order)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Replace the administrator-editable settings. The member field itself
    /// is fixed once created.
    pub async fn update_settings(
        id: ProfileFieldId,
        settings: &FieldSettings,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE profile_fields SET
                profile_visibility = $2,
                registration_visibility = $3,
                member_list_visible = $4,
                public_visibility = $5,
                public_visibility_default = $6,
                custom_title = $7,
                default_value = $8,
                note = $9,
                custom_error = $10,
                is_unique = $11,
                is_required = $12
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(settings.profile_visibility)
        .bind(settings.registration_visibility)
        .bind(settings.member_list_visible)
        .bind(settings.public_visibility)
        .bind(settings.public_visibility_default)
        .bind(settings.custom_title.as_deref().filter(|t| !t.is_empty()))
        .bind(&settings.default_value)
        .bind(&settings.note)
        .bind(&settings.custom_error)
        .bind(settings.unique)
        .bind(settings.required)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: ProfileFieldId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM profile_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
