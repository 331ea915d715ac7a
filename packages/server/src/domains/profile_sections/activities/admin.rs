//! Administration of profile page sections behind the access guard.

use tracing::info;

use crate::common::auth::{AccessAction, AccessContext, Actor};
use crate::common::{ProfileError, ProfileResult, ProfileSectionId};
use crate::domains::profile_fields::activities::admin::parent_page;
use crate::domains::profile_sections::models::profile_section::{
    NewProfileSection, ProfileSection,
};
use crate::kernel::ServerDeps;

async fn load_section(id: ProfileSectionId, deps: &ServerDeps) -> ProfileResult<ProfileSection> {
    deps.store
        .find_section(id)
        .await?
        .ok_or(ProfileError::SectionNotFound(id))
}

pub async fn create_section(
    new: NewProfileSection,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<ProfileSection> {
    let parent = parent_page(&new, deps).await?;
    deps.access_guard().ensure(
        AccessAction::Create,
        actor,
        &new,
        parent.as_ref(),
        &AccessContext::default(),
    )?;

    let section = deps.store.insert_section(new).await?;
    info!(section_id = %section.id, kind = ?section.kind, "Profile section created");
    Ok(section)
}

pub async fn rename_section(
    id: ProfileSectionId,
    custom_title: Option<String>,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<ProfileSection> {
    let section = load_section(id, deps).await?;
    let parent = parent_page(&section, deps).await?;
    deps.access_guard().ensure(
        AccessAction::Edit,
        actor,
        &section,
        parent.as_ref(),
        &AccessContext::default(),
    )?;

    Ok(deps.store.rename_section(id, custom_title.as_deref()).await?)
}

pub async fn delete_section(
    id: ProfileSectionId,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<()> {
    let section = load_section(id, deps).await?;
    let parent = parent_page(&section, deps).await?;
    deps.access_guard().ensure(
        AccessAction::Delete,
        actor,
        &section,
        parent.as_ref(),
        &AccessContext::default(),
    )?;

    deps.store.delete_section(id).await?;
    info!(section_id = %id, "Profile section deleted");
    Ok(())
}
