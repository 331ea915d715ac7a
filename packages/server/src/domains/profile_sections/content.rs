//! Rendering a section for the member being viewed.
//!
//! A [`SectionBinding`] pairs a section with the viewed member for a single
//! render and is never cached or stored.

use serde::{Deserialize, Serialize};

use super::models::profile_section::{ProfileSection, SectionKind};
use crate::common::{ConfigurationError, ProfileSectionId};
use crate::domains::listing::projection::{detail_entries, DetailEntry};
use crate::domains::member::Member;
use crate::domains::profile_fields::{ProfileField, VisibilityResolver};
use crate::kernel::field_definitions::FieldCatalog;

pub struct SectionBinding<'a> {
    pub section: &'a ProfileSection,
    pub member: &'a Member,
}

impl<'a> SectionBinding<'a> {
    pub fn new(section: &'a ProfileSection, member: &'a Member) -> Self {
        Self { section, member }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionContent {
    FieldsList { entries: Vec<DetailEntry> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedSection {
    pub id: ProfileSectionId,
    /// `None` when the section kind does not display its title
    pub title: Option<String>,
    pub content: SectionContent,
}

pub fn renderable_content(
    binding: &SectionBinding<'_>,
    rules: &[&ProfileField],
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<SectionContent, ConfigurationError> {
    match binding.section.kind {
        SectionKind::FieldsList => Ok(SectionContent::FieldsList {
            entries: detail_entries(binding.member, rules, resolver, catalog)?,
        }),
    }
}

pub fn render(
    binding: &SectionBinding<'_>,
    rules: &[&ProfileField],
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<RenderedSection, ConfigurationError> {
    let section = binding.section;
    Ok(RenderedSection {
        id: section.id,
        title: section
            .kind
            .show_title()
            .then(|| section.title().to_string()),
        content: renderable_content(binding, rules, resolver, catalog)?,
    })
}
