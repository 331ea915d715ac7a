use crate::common::{ProfileError, ProfilePageId, ProfileResult};
use crate::domains::profile_fields::forms::{plan_form, FormContext, FormFieldPlan};
use crate::kernel::ServerDeps;

/// Fields shown on a page's profile or registration form, in order.
pub async fn form_plan(
    page_id: ProfilePageId,
    context: FormContext,
    deps: &ServerDeps,
) -> ProfileResult<Vec<FormFieldPlan>> {
    deps.store
        .find_page(page_id)
        .await?
        .ok_or(ProfileError::PageNotFound(page_id))?;

    let fields = deps.store.fields_for_page(page_id).await?;
    let catalog = deps.field_definitions.catalog();
    Ok(plan_form(&fields, context, &deps.resolver, &catalog)?)
}
