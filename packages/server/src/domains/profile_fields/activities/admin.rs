//! Administration of profile fields behind the access guard.

use tracing::info;

use crate::common::auth::{AccessAction, AccessContext, Actor, PageOwned};
use crate::common::{ProfileError, ProfileFieldId, ProfilePageId, ProfileResult};
use crate::domains::profile_fields::forms::{summarize, FieldSummary};
use crate::domains::profile_fields::models::profile_field::{
    FieldSettings, NewProfileField, ProfileField,
};
use crate::domains::profile_pages::ProfilePage;
use crate::kernel::ServerDeps;

/// The resource's parent page, if it still exists.
pub(crate) async fn parent_page<R: PageOwned>(
    resource: &R,
    deps: &ServerDeps,
) -> ProfileResult<Option<ProfilePage>> {
    match resource.parent_page_id() {
        Some(page_id) => Ok(deps.store.find_page(page_id).await?),
        None => Ok(None),
    }
}

async fn load_field(id: ProfileFieldId, deps: &ServerDeps) -> ProfileResult<ProfileField> {
    deps.store
        .find_field(id)
        .await?
        .ok_or(ProfileError::FieldNotFound(id))
}

/// Create a field. The member field must exist on the member form.
pub async fn create_field(
    new: NewProfileField,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<ProfileField> {
    let parent = parent_page(&new, deps).await?;
    let context = AccessContext::default().with("member_field", new.member_field.as_str());
    deps.access_guard()
        .ensure(AccessAction::Create, actor, &new, parent.as_ref(), &context)?;

    deps.field_definitions.definition(&new.member_field)?;

    let field = deps.store.insert_field(new).await?;
    info!(
        field_id = %field.id,
        member_field = %field.member_field,
        sort_order = field.sort_order,
        "Profile field created"
    );
    Ok(field)
}

pub async fn update_field(
    id: ProfileFieldId,
    settings: FieldSettings,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<ProfileField> {
    let field = load_field(id, deps).await?;
    let parent = parent_page(&field, deps).await?;
    deps.access_guard().ensure(
        AccessAction::Edit,
        actor,
        &field,
        parent.as_ref(),
        &AccessContext::default(),
    )?;

    let updated = deps.store.update_field(id, &settings).await?;
    info!(field_id = %id, "Profile field updated");
    Ok(updated)
}

pub async fn delete_field(
    id: ProfileFieldId,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<()> {
    let field = load_field(id, deps).await?;
    let parent = parent_page(&field, deps).await?;
    deps.access_guard().ensure(
        AccessAction::Delete,
        actor,
        &field,
        parent.as_ref(),
        &AccessContext::default(),
    )?;

    deps.store.delete_field(id).await?;
    info!(field_id = %id, "Profile field deleted");
    Ok(())
}

/// Administration view of every field on a page the actor may see.
pub async fn list_field_summaries(
    page_id: ProfilePageId,
    actor: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<Vec<FieldSummary>> {
    let page = deps
        .store
        .find_page(page_id)
        .await?
        .ok_or(ProfileError::PageNotFound(page_id))?;
    let fields = deps.store.fields_for_page(page_id).await?;
    let catalog = deps.field_definitions.catalog();
    let guard = deps.access_guard();
    let context = AccessContext::default();

    let mut summaries = Vec::new();
    for field in fields
        .iter()
        .filter(|field| guard.check(AccessAction::View, actor, *field, Some(&page), &context))
    {
        summaries.push(summarize(field, &deps.resolver, &catalog)?);
    }
    Ok(summaries)
}
