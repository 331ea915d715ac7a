pub mod admin;

pub use admin::{create_section, delete_section, rename_section};
