//! Member listing and public profile pages.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::auth::Actor;
use crate::common::{MemberId, ProfileError, ProfilePageId, ProfileResult};
use crate::domains::listing::projection::{listing_row, ordered_rules, ListingCell};
use crate::domains::member::Member;
use crate::domains::profile_pages::ProfilePage;
use crate::domains::profile_sections::{render, RenderedSection, SectionBinding};
use crate::kernel::{ListingWindow, ServerDeps};

pub const MEMBER_LIST_TITLE: &str = "Member List";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    pub member_id: MemberId,
    pub cells: Vec<ListingCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListing {
    pub title: String,
    pub rows: Vec<ListingRow>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfileView {
    pub title: String,
    pub member_id: MemberId,
    /// The viewer is looking at their own profile
    pub is_self: bool,
    pub sections: Vec<RenderedSection>,
}

async fn load_page(page_id: ProfilePageId, deps: &ServerDeps) -> ProfileResult<ProfilePage> {
    deps.store
        .find_page(page_id)
        .await?
        .ok_or(ProfileError::PageNotFound(page_id))
}

/// Members listed on a page. Pages restricted to groups only list members of
/// those groups.
pub async fn list_members(
    page_id: ProfilePageId,
    window: ListingWindow,
    deps: &ServerDeps,
) -> ProfileResult<MemberListing> {
    let page = load_page(page_id, deps).await?;
    let groups = deps.store.page_groups(page_id).await?;
    let (members, total) = deps.store.members_for_listing(&groups, window).await?;

    let fields = deps.store.fields_for_page(page_id).await?;
    let rules = ordered_rules(&fields);
    let catalog = deps.field_definitions.catalog();

    let mut rows = Vec::with_capacity(members.len());
    for member in &members {
        rows.push(ListingRow {
            member_id: member.id,
            cells: listing_row(
                member,
                &page.member_link(member.id),
                &rules,
                &deps.resolver,
                &catalog,
            )?,
        });
    }

    debug!(page_id = %page_id, total, shown = rows.len(), "Member listing built");
    Ok(MemberListing {
        title: MEMBER_LIST_TITLE.to_string(),
        rows,
        total,
        offset: window.offset,
        limit: window.limit,
    })
}

/// Public profile of one member as shown through `page_id`.
pub async fn view_member(
    page_id: ProfilePageId,
    member_id: MemberId,
    viewer: Option<&Actor>,
    deps: &ServerDeps,
) -> ProfileResult<MemberProfileView> {
    load_page(page_id, deps).await?;
    let member = deps
        .store
        .find_member(member_id)
        .await?
        .ok_or(ProfileError::MemberNotFound(member_id))?;

    let groups = deps.store.page_groups(page_id).await?;
    if !groups.is_empty() && !deps.store.member_in_groups(member_id, &groups).await? {
        return Err(ProfileError::MemberNotListed(member_id));
    }

    let fields = deps.store.fields_for_page(page_id).await?;
    let rules = ordered_rules(&fields);
    let catalog = deps.field_definitions.catalog();

    let mut sections = Vec::new();
    for section in deps.store.sections_for_page(page_id).await? {
        let binding = SectionBinding::new(&section, &member);
        sections.push(render(&binding, &rules, &deps.resolver, &catalog)?);
    }

    Ok(MemberProfileView {
        title: profile_title(&member),
        member_id,
        is_self: viewer.is_some_and(|actor| actor.is_member(member_id)),
        sections,
    })
}

pub fn profile_title(member: &Member) -> String {
    format!("{}'s Profile", member.name())
}
