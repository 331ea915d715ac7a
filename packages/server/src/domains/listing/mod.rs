//! Listing domain - public member listings and profile pages

pub mod activities;
pub mod projection;

pub use projection::{DetailEntry, ListingCell, ListingValue, MemberAttributes};
