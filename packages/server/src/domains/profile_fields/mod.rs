//! Profile fields - per-field visibility rules and how they resolve

pub mod activities;
pub mod forms;
pub mod models;
pub mod visibility;

pub use forms::{DefaultValueWidget, FieldSummary, FormContext, FormFieldPlan};
pub use models::{FieldSettings, FormVisibility, NewProfileField, ProfileField, PublicVisibility};
pub use visibility::{
    FieldPresentation, LockedSettings, SystemFields, ViewContext, VisibilityResolver,
    PASSWORD_FIELD,
};
