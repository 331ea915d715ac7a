//! Member domain - accounts, workflow state and public-field opt-ins

pub mod activities;
pub mod models;
pub mod public_fields;
pub mod state;

pub use models::member::Member;
pub use public_fields::PublicFieldSelections;
pub use state::{
    approval_notice_due, generate_validation_token, AccountStatus, FieldChange, LoginBlocked,
    LoginBlocker, MemberState,
};
