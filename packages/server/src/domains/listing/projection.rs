//! Public projection of members for listings and detail pages.
//!
//! Listings show every field marked member-list-visible, but a MemberChoice
//! field the member has not opted into yields [`ListingValue::NoValue`]
//! rather than its stored value. Detail pages only show fields that are
//! publicly visible for this member.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::common::ConfigurationError;
use crate::domains::member::{Member, PublicFieldSelections};
use crate::domains::profile_fields::forms::field_title;
use crate::domains::profile_fields::{ProfileField, VisibilityResolver};
use crate::kernel::field_definitions::FieldCatalog;

/// Read access to the member attributes a projection needs.
pub trait MemberAttributes {
    fn attribute(&self, member_field: &str) -> Option<String>;

    /// Whether the attribute is a first-class stored column (and so sortable).
    fn has_stored_column(&self, member_field: &str) -> bool;

    fn public_fields(&self) -> &PublicFieldSelections;
}

impl MemberAttributes for Member {
    fn attribute(&self, member_field: &str) -> Option<String> {
        Member::attribute(self, member_field)
    }

    fn has_stored_column(&self, member_field: &str) -> bool {
        Member::has_stored_column(member_field)
    }

    fn public_fields(&self) -> &PublicFieldSelections {
        &self.state.public_fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ListingValue {
    /// The member has not made this field public
    NoValue,
    /// The stored value; `None` when the member never set the attribute
    Value(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCell {
    pub name: String,
    pub title: String,
    pub value: ListingValue,
    pub sortable: bool,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailEntry {
    pub name: String,
    pub title: String,
    pub value: Option<String>,
}

/// Rules in display order with duplicate member fields removed (first wins).
pub fn ordered_rules(fields: &[ProfileField]) -> Vec<&ProfileField> {
    let mut ordered: Vec<&ProfileField> = fields.iter().collect();
    ordered.sort_by_key(|field| field.sort_order);

    let mut seen = HashSet::new();
    ordered.retain(|field| seen.insert(field.member_field.clone()));
    ordered
}

pub fn listing_row<M: MemberAttributes>(
    member: &M,
    link: &str,
    rules: &[&ProfileField],
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<Vec<ListingCell>, ConfigurationError> {
    let mut cells = Vec::new();
    for field in rules
        .iter()
        .filter(|field| resolver.effective_member_list_visible(field))
    {
        let value = if resolver.is_withheld_from_listing(field, member.public_fields()) {
            ListingValue::NoValue
        } else {
            ListingValue::Value(member.attribute(&field.member_field))
        };

        cells.push(ListingCell {
            name: field.member_field.clone(),
            title: field_title(field, catalog)?,
            value,
            sortable: member.has_stored_column(&field.member_field),
            link: link.to_string(),
        });
    }
    Ok(cells)
}

pub fn detail_entries<M: MemberAttributes>(
    member: &M,
    rules: &[&ProfileField],
    resolver: &VisibilityResolver,
    catalog: &FieldCatalog,
) -> Result<Vec<DetailEntry>, ConfigurationError> {
    let mut entries = Vec::new();
    for field in rules
        .iter()
        .filter(|field| resolver.is_publicly_shown(field, member.public_fields()))
    {
        entries.push(DetailEntry {
            name: field.member_field.clone(),
            title: field_title(field, catalog)?,
            value: member.attribute(&field.member_field),
        });
    }
    Ok(entries)
}
