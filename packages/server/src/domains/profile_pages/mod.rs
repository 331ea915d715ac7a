//! Profile pages - the site pages that own visibility rules and sections

pub mod models;

pub use models::profile_page::{NotificationType, ProfilePage};
