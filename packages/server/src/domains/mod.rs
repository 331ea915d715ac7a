// Business domains
pub mod auth;
pub mod listing;
pub mod member;
pub mod profile_fields;
pub mod profile_pages;
pub mod profile_sections;
