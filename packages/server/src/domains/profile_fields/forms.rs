//! Titles and form plans for profile fields.

use serde::{Deserialize, Serialize};

use super::models::profile_field::{FieldSettings, FormVisibility, ProfileField};
use super::visibility::{LockedSettings, VisibilityResolver};
use crate::common::{ConfigurationError, ProfileFieldId};
use crate::kernel::field_definitions::{ChoiceOption, FieldCatalog, FieldDefinition, FieldKind};

/// Custom title if set, else the member form's title (which may be empty).
pub fn field_title(field: &ProfileField, catalog: &FieldCatalog) -> Result<String, ConfigurationError> {
    if let Some(title) = &field.custom_title {
        return Ok(title.clone());
    }
    Ok(catalog.get(&field.member_field)?.title.clone())
}

/// Like [`field_title`] but never empty.
pub fn summary_title(field: &ProfileField, catalog: &FieldCatalog) -> Result<String, ConfigurationError> {
    let title = field_title(field, catalog)?;
    if title.is_empty() {
        Ok(field.member_field.clone())
    } else {
        Ok(title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormContext {
    Profile,
    Registration,
}

/// Widget an administrator uses to pick a field's default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum DefaultValueWidget {
    Dropdown { options: Vec<ChoiceOption> },
    TextField,
    None,
}

impl DefaultValueWidget {
    pub fn for_definition(definition: &FieldDefinition) -> Self {
        match definition.kind {
            FieldKind::Choice => DefaultValueWidget::Dropdown {
                options: definition.options.clone(),
            },
            FieldKind::Text => DefaultValueWidget::TextField,
            FieldKind::Other => DefaultValueWidget::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldPlan {
    pub member_field: String,
    pub title: String,
    pub visibility: FormVisibility,
    pub kind: FieldKind,
    pub options: Vec<ChoiceOption>,
    pub required: bool,
    pub unique: bool,
    pub default_value: Option<String>,
    pub note: Option<String>,
    pub custom_error: Option<String>,
}

/// Non-hidden fields of a form in display order.
pub fn plan_form(
    fields: &[ProfileField],
    context: FormContext,
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<Vec<FormFieldPlan>, ConfigurationError> {
    let mut plan = Vec::new();
    for field in fields {
        let visibility = match context {
            FormContext::Profile => field.profile_visibility,
            FormContext::Registration => field.registration_visibility,
        };
        if visibility == FormVisibility::Hidden {
            continue;
        }

        let definition = catalog.get(&field.member_field)?;
        plan.push(FormFieldPlan {
            member_field: field.member_field.clone(),
            title: summary_title(field, catalog)?,
            visibility,
            kind: definition.kind,
            options: definition.options.clone(),
            required: resolver.effective_required(field),
            unique: resolver.effective_unique(field),
            default_value: field.default_value.clone(),
            note: field.note.clone(),
            custom_error: field.custom_error.clone(),
        });
    }
    Ok(plan)
}

/// A field as presented on the administration screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSummary {
    pub id: ProfileFieldId,
    pub member_field: String,
    pub title: String,
    pub settings: FieldSettings,
    pub effective_required: bool,
    pub effective_unique: bool,
    pub locked: LockedSettings,
    pub default_value_widget: DefaultValueWidget,
    pub sort_order: i32,
}

pub fn summarize(
    field: &ProfileField,
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<FieldSummary, ConfigurationError> {
    let definition = catalog.get(&field.member_field)?;
    Ok(FieldSummary {
        id: field.id,
        member_field: field.member_field.clone(),
        title: summary_title(field, catalog)?,
        settings: field.settings(),
        effective_required: resolver.effective_required(field),
        effective_unique: resolver.effective_unique(field),
        locked: resolver.locked_settings(field),
        default_value_widget: DefaultValueWidget::for_definition(definition),
        sort_order: field.sort_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ProfilePageId;
    use crate::domains::profile_fields::models::profile_field::NewProfileField;
    use crate::kernel::field_definitions::{MemberFormSource, StaticMemberForm};

    fn catalog() -> FieldCatalog {
        let form = StaticMemberForm::default().with_field(FieldDefinition::text("Nickname", ""));
        FieldCatalog::new(form.member_form_fields())
    }

    fn field(member_field: &str, settings: FieldSettings) -> ProfileField {
        ProfileField::from_new(
            NewProfileField::new(ProfilePageId::new(), member_field).with_settings(settings),
            1,
        )
    }

    #[test]
    fn test_custom_title_overrides_definition() {
        let catalog = catalog();
        let named = field("Surname", FieldSettings::builder().custom_title("Family name").build());
        let plain = field("Surname", FieldSettings::default());

        assert_eq!(field_title(&named, &catalog).unwrap(), "Family name");
        assert_eq!(field_title(&plain, &catalog).unwrap(), "Surname");
    }

    #[test]
    fn test_summary_title_falls_back_to_field_name() {
        let catalog = catalog();
        let nickname = field("Nickname", FieldSettings::default());

        assert_eq!(field_title(&nickname, &catalog).unwrap(), "");
        assert_eq!(summary_title(&nickname, &catalog).unwrap(), "Nickname");
    }

    #[test]
    fn test_unknown_field_propagates_configuration_error() {
        let catalog = catalog();
        let ghost = field("Shoe size", FieldSettings::default());

        assert_eq!(
            field_title(&ghost, &catalog).unwrap_err(),
            ConfigurationError::UnknownMemberField("Shoe size".to_string())
        );
    }

    #[test]
    fn test_default_value_widget_follows_kind() {
        let catalog = catalog();

        assert!(matches!(
            DefaultValueWidget::for_definition(catalog.get("Locale").unwrap()),
            DefaultValueWidget::Dropdown { options } if !options.is_empty()
        ));
        assert_eq!(
            DefaultValueWidget::for_definition(catalog.get("Surname").unwrap()),
            DefaultValueWidget::TextField
        );
        assert_eq!(
            DefaultValueWidget::for_definition(catalog.get("Password").unwrap()),
            DefaultValueWidget::None
        );
    }

    #[test]
    fn test_registration_plan_skips_hidden_and_forces_identifier() {
        let catalog = catalog();
        let resolver = VisibilityResolver::default();
        let fields = vec![
            field(
                "Email",
                FieldSettings::builder()
                    .registration_visibility(FormVisibility::Edit)
                    .build(),
            ),
            field(
                "Surname",
                FieldSettings::builder()
                    .profile_visibility(FormVisibility::Edit)
                    .build(),
            ),
            field(
                "Locale",
                FieldSettings::builder()
                    .registration_visibility(FormVisibility::Readonly)
                    .default_value("en_GB")
                    .build(),
            ),
        ];

        let plan = plan_form(&fields, FormContext::Registration, &resolver, &catalog).unwrap();

        let names: Vec<_> = plan.iter().map(|p| p.member_field.as_str()).collect();
        assert_eq!(names, vec!["Email", "Locale"]);
        assert!(plan[0].required && plan[0].unique);
        assert_eq!(plan[1].visibility, FormVisibility::Readonly);
        assert_eq!(plan[1].default_value.as_deref(), Some("en_GB"));
        assert_eq!(plan[1].kind, FieldKind::Choice);
    }

    #[test]
    fn test_password_summary_is_locked() {
        let catalog = catalog();
        let resolver = VisibilityResolver::default();

        let summary = summarize(&field("Password", FieldSettings::default()), &resolver, &catalog).unwrap();

        assert!(summary.effective_required);
        assert!(summary.locked.public_visibility && summary.locked.member_list_visible);
        assert_eq!(summary.default_value_widget, DefaultValueWidget::None);
    }
}
