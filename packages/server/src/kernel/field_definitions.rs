//! Member form-field definitions
//!
//! Titles and widget kinds of the member attributes a profile field can
//! point at. Building the member form is comparatively expensive and is
//! derived from static configuration, so the provider memoizes it for the
//! process and exposes `invalidate()` for when that configuration changes.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::common::ConfigurationError;

/// Member state attributes that are never offered as form fields.
pub const INTERNAL_MEMBER_FIELDS: [&str; 5] = [
    "ValidationKey",
    "NeedsValidation",
    "NeedsApproval",
    "ProfilePageID",
    "PublicFields",
];

/// Group membership selector appended to every member form.
pub const GROUPS_FIELD: &str = "Groups";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Choice,
    Text,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    /// May be empty; callers fall back to `name` where a title is required.
    pub title: String,
    pub kind: FieldKind,
    pub options: Vec<ChoiceOption>,
}

impl FieldDefinition {
    pub fn text(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind: FieldKind::Text,
            options: Vec::new(),
        }
    }

    pub fn choice(name: &str, title: &str, options: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind: FieldKind::Choice,
            options: options
                .iter()
                .map(|(value, label)| ChoiceOption {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    pub fn other(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            kind: FieldKind::Other,
            options: Vec::new(),
        }
    }
}

/// The member form as offered to profile pages.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldDefinition>,
}

impl FieldCatalog {
    /// Internal state attributes are removed and a `Groups` selector is
    /// appended when the source does not define one.
    pub fn new(fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        let mut fields: Vec<FieldDefinition> = fields
            .into_iter()
            .filter(|field| !INTERNAL_MEMBER_FIELDS.contains(&field.name.as_str()))
            .collect();

        if !fields.iter().any(|field| field.name == GROUPS_FIELD) {
            fields.push(FieldDefinition::choice(GROUPS_FIELD, "Groups", &[]));
        }

        Self { fields }
    }

    pub fn get(&self, member_field: &str) -> Result<&FieldDefinition, ConfigurationError> {
        self.fields
            .iter()
            .find(|field| field.name == member_field)
            .ok_or_else(|| ConfigurationError::UnknownMemberField(member_field.to_string()))
    }

    pub fn contains(&self, member_field: &str) -> bool {
        self.fields.iter().any(|field| field.name == member_field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter()
    }
}

/// Produces the raw member form (before filtering).
pub trait MemberFormSource: Send + Sync {
    fn member_form_fields(&self) -> Vec<FieldDefinition>;
}

pub trait BaseFieldDefinitionProvider: Send + Sync {
    fn catalog(&self) -> Arc<FieldCatalog>;

    /// Drop any cached catalog so the next call rebuilds it.
    fn invalidate(&self);

    fn definition(&self, member_field: &str) -> Result<FieldDefinition, ConfigurationError> {
        self.catalog().get(member_field).cloned()
    }
}

pub struct MemoizedFieldDefinitions<S> {
    source: S,
    cache: RwLock<Option<Arc<FieldCatalog>>>,
}

impl<S: MemberFormSource> MemoizedFieldDefinitions<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }
}

impl<S: MemberFormSource> BaseFieldDefinitionProvider for MemoizedFieldDefinitions<S> {
    fn catalog(&self) -> Arc<FieldCatalog> {
        if let Some(catalog) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return catalog.clone();
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache
            .get_or_insert_with(|| {
                debug!("Building member form field catalog");
                Arc::new(FieldCatalog::new(self.source.member_form_fields()))
            })
            .clone()
    }

    fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Member form built from a fixed list of definitions.
#[derive(Debug, Clone)]
pub struct StaticMemberForm {
    fields: Vec<FieldDefinition>,
}

impl StaticMemberForm {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.retain(|existing| existing.name != field.name);
        self.fields.push(field);
        self
    }
}

impl Default for StaticMemberForm {
    fn default() -> Self {
        Self::new(vec![
            FieldDefinition::text("FirstName", "First Name"),
            FieldDefinition::text("Surname", "Surname"),
            FieldDefinition::text("Email", "Email"),
            FieldDefinition::other("Password", "Password"),
            FieldDefinition::choice(
                "Locale",
                "Interface Locale",
                &[("en_US", "English (US)"), ("en_GB", "English (UK)"), ("es_ES", "Spanish")],
            ),
            FieldDefinition::text("ValidationKey", "Validation Key"),
            FieldDefinition::other("NeedsValidation", "Needs Validation"),
            FieldDefinition::other("NeedsApproval", "Needs Approval"),
            FieldDefinition::other("ProfilePageID", "Profile Page"),
            FieldDefinition::other("PublicFields", "Public Fields"),
        ])
    }
}

impl MemberFormSource for StaticMemberForm {
    fn member_form_fields(&self) -> Vec<FieldDefinition> {
        self.fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingForm {
        loads: AtomicUsize,
        fields: Mutex<Vec<FieldDefinition>>,
    }

    impl MemberFormSource for Arc<CountingForm> {
        fn member_form_fields(&self) -> Vec<FieldDefinition> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.fields.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_catalog_is_built_once() {
        let form = Arc::new(CountingForm {
            loads: AtomicUsize::new(0),
            fields: Mutex::new(vec![FieldDefinition::text("Email", "Email")]),
        });
        let provider = MemoizedFieldDefinitions::new(form.clone());

        for _ in 0..20 {
            provider.definition("Email").unwrap();
        }

        assert_eq!(form.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalidate_picks_up_new_configuration() {
        let form = Arc::new(CountingForm {
            loads: AtomicUsize::new(0),
            fields: Mutex::new(vec![FieldDefinition::text("Email", "Email")]),
        });
        let provider = MemoizedFieldDefinitions::new(form.clone());
        assert!(provider.definition("Phone").is_err());

        form.fields
            .lock()
            .unwrap()
            .push(FieldDefinition::text("Phone", "Phone Number"));
        assert!(provider.definition("Phone").is_err());

        provider.invalidate();
        assert_eq!(provider.definition("Phone").unwrap().title, "Phone Number");
        assert_eq!(form.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_internal_fields_are_not_offered() {
        let catalog = FieldCatalog::new(StaticMemberForm::default().member_form_fields());

        for internal in INTERNAL_MEMBER_FIELDS {
            assert!(!catalog.contains(internal), "{} should be hidden", internal);
        }
        assert!(catalog.contains("Email"));
        assert_eq!(catalog.get(GROUPS_FIELD).unwrap().kind, FieldKind::Choice);
    }

    #[test]
    fn test_unknown_field_is_configuration_error() {
        let catalog = FieldCatalog::new(vec![]);

        assert_eq!(
            catalog.get("Nickname").unwrap_err(),
            ConfigurationError::UnknownMemberField("Nickname".to_string())
        );
    }
}
