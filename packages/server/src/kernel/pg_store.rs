//! Postgres-backed profile store delegating to the domain models.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::{BaseProfileStore, ListingWindow};
use crate::common::{GroupId, MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
use crate::domains::member::{FieldChange, Member, PublicFieldSelections};
use crate::domains::profile_fields::{FieldSettings, NewProfileField, ProfileField};
use crate::domains::profile_pages::ProfilePage;
use crate::domains::profile_sections::{NewProfileSection, ProfileSection};

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseProfileStore for PgProfileStore {
    async fn find_page(&self, id: ProfilePageId) -> Result<Option<ProfilePage>> {
        ProfilePage::find_by_id(id, &self.pool).await
    }

    async fn page_groups(&self, id: ProfilePageId) -> Result<Vec<GroupId>> {
        ProfilePage::group_ids(id, &self.pool).await
    }

    async fn fields_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileField>> {
        ProfileField::find_by_page(page_id, &self.pool).await
    }

    async fn find_field(&self, id: ProfileFieldId) -> Result<Option<ProfileField>> {
        ProfileField::find_by_id(id, &self.pool).await
    }

    async fn insert_field(&self, new: NewProfileField) -> Result<ProfileField> {
        ProfileField::create(new, &self.pool)
            .await
            .context("Failed to insert profile field")
    }

    async fn update_field(
        &self,
        id: ProfileFieldId,
        settings: &FieldSettings,
    ) -> Result<ProfileField> {
        ProfileField::update_settings(id, settings, &self.pool).await
    }

    async fn delete_field(&self, id: ProfileFieldId) -> Result<()> {
        ProfileField::delete(id, &self.pool).await
    }

    async fn sections_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileSection>> {
        ProfileSection::find_by_page(page_id, &self.pool).await
    }

    async fn find_section(&self, id: ProfileSectionId) -> Result<Option<ProfileSection>> {
        ProfileSection::find_by_id(id, &self.pool).await
    }

    async fn insert_section(&self, new: NewProfileSection) -> Result<ProfileSection> {
        ProfileSection::create(new, &self.pool)
            .await
            .context("Failed to insert profile section")
    }

    async fn rename_section(
        &self,
        id: ProfileSectionId,
        custom_title: Option<&str>,
    ) -> Result<ProfileSection> {
        ProfileSection::rename(id, custom_title, &self.pool).await
    }

    async fn delete_section(&self, id: ProfileSectionId) -> Result<()> {
        ProfileSection::delete(id, &self.pool).await
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Member::find_by_id(id, &self.pool).await
    }

    async fn find_member_by_attribute(
        &self,
        member_field: &str,
        value: &str,
    ) -> Result<Option<Member>> {
        Member::find_by_attribute(member_field, value, &self.pool).await
    }

    async fn insert_member(&self, member: &Member) -> Result<Member> {
        member
            .insert(&self.pool)
            .await
            .context("Failed to insert member")
    }

    async fn members_for_listing(
        &self,
        groups: &[GroupId],
        window: ListingWindow,
    ) -> Result<(Vec<Member>, i64)> {
        Member::find_for_listing(groups, window.offset, window.limit, &self.pool).await
    }

    async fn member_in_groups(&self, id: MemberId, groups: &[GroupId]) -> Result<bool> {
        Member::is_in_any_group(id, groups, &self.pool).await
    }

    async fn set_needs_validation(
        &self,
        id: MemberId,
        value: bool,
    ) -> Result<Option<FieldChange<bool>>> {
        Member::set_needs_validation(id, value, &self.pool).await
    }

    async fn set_needs_approval(
        &self,
        id: MemberId,
        value: bool,
    ) -> Result<Option<FieldChange<bool>>> {
        Member::set_needs_approval(id, value, &self.pool).await
    }

    async fn set_public_fields(
        &self,
        id: MemberId,
        selections: &PublicFieldSelections,
    ) -> Result<()> {
        Member::set_public_fields(id, selections, &self.pool).await
    }
}
