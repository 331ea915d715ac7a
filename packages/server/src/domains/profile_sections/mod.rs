//! Profile sections - ordered, typed content blocks of a profile page

pub mod activities;
pub mod content;
pub mod models;

pub use content::{render, renderable_content, RenderedSection, SectionBinding, SectionContent};
pub use models::{NewProfileSection, ProfileSection, SectionKind};
