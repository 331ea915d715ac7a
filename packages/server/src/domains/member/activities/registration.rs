//! Register a member through a profile page's registration form

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::notify::dispatch_confirmation;
use crate::common::{ProfileError, ProfilePageId, ProfileResult};
use crate::domains::member::{Member, MemberState, PublicFieldSelections};
use crate::domains::profile_fields::{FormVisibility, ProfileField, PASSWORD_FIELD};
use crate::kernel::field_definitions::GROUPS_FIELD;
use crate::kernel::ServerDeps;

/// Submitted registration form, keyed by member field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub values: BTreeMap<String, String>,
}

impl Registration {
    pub fn with(mut self, member_field: &str, value: &str) -> Self {
        self.values.insert(member_field.to_string(), value.to_string());
        self
    }

    fn value(&self, member_field: &str) -> Option<&str> {
        self.values
            .get(member_field)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Create an account against `page_id`.
///
/// Only fields editable on the registration form are taken from the
/// submission; read-only ones receive their default value. The new member
/// gets a fresh validation token, the page's validation and approval
/// requirements, and the default public-field opt-ins.
pub async fn register_member(
    page_id: ProfilePageId,
    registration: Registration,
    deps: &ServerDeps,
) -> ProfileResult<Member> {
    let page = deps
        .store
        .find_page(page_id)
        .await?
        .ok_or(ProfileError::PageNotFound(page_id))?;
    let fields = deps.store.fields_for_page(page_id).await?;
    let catalog = deps.field_definitions.catalog();

    for name in registration.values.keys() {
        catalog.get(name)?;
    }

    let identifier = deps.resolver.system().identifier_field();
    let account = registration
        .value(identifier)
        .ok_or_else(|| ProfileError::MissingRequiredField(identifier.to_string()))?
        .trim()
        .to_string();
    if deps
        .store
        .find_member_by_attribute(identifier, &account)
        .await?
        .is_some()
    {
        return Err(ProfileError::IdentifierTaken(account));
    }

    let selections = PublicFieldSelections::defaults_for(&fields, &deps.resolver);
    let mut member = Member::with_state(MemberState::for_registration(&page, selections));
    member.profile_page_id = Some(page.id);
    member.set_attribute(identifier, account);

    for field in &fields {
        let name = field.member_field.as_str();
        let submitted = match field.registration_visibility {
            FormVisibility::Edit => registration.value(name),
            FormVisibility::Readonly | FormVisibility::Hidden => None,
        };
        let value = submitted.or(field.default_value.as_deref());

        if field.registration_visibility != FormVisibility::Hidden
            && deps.resolver.effective_required(field)
            && value.is_none()
        {
            return Err(ProfileError::MissingRequiredField(field.member_field.clone()));
        }

        match value {
            _ if name == identifier || name == PASSWORD_FIELD || name == GROUPS_FIELD => {}
            None => {}
            Some(value) => member.set_attribute(name, value.to_string()),
        }
    }

    ensure_unique_values(&member, &fields, deps).await?;

    let member = deps.store.insert_member(&member).await?;
    info!(
        member_id = %member.id,
        page_id = %page.id,
        needs_validation = member.state.needs_validation,
        needs_approval = member.state.needs_approval,
        "Member registered"
    );

    if page.email_type.sends_email() {
        dispatch_confirmation(&page, &member, deps).await;
    } else {
        debug!(page_id = %page.id, "Page sends no registration email");
    }

    Ok(member)
}

/// Reject values another member already holds for fields marked unique.
async fn ensure_unique_values(
    member: &Member,
    fields: &[ProfileField],
    deps: &ServerDeps,
) -> ProfileResult<()> {
    let identifier = deps.resolver.system().identifier_field();
    for field in fields.iter().filter(|field| deps.resolver.effective_unique(field)) {
        let name = field.member_field.as_str();
        if name == identifier || name == PASSWORD_FIELD || name == GROUPS_FIELD {
            continue;
        }
        let Some(value) = member.attribute(name) else {
            continue;
        };
        if deps
            .store
            .find_member_by_attribute(name, &value)
            .await?
            .is_some()
        {
            return Err(ProfileError::DuplicateValue(name.to_string()));
        }
    }
    Ok(())
}
