pub mod approval;
mod notify;
pub mod profile;
pub mod registration;
pub mod validation;

pub use approval::{approve_member, set_needs_approval};
pub use profile::{account_status, check_login, update_public_fields};
pub use registration::{register_member, Registration};
pub use validation::{
    apply_manual_email_validation, confirm_member, confirm_with_token, resend_confirmation,
    ManualEmailValidation,
};
