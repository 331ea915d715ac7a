pub mod admin;
pub mod forms;

pub use admin::{create_field, delete_field, list_field_summaries, update_field};
pub use forms::form_plan;
