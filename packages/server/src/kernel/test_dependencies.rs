// TestDependencies - mock implementations for testing
//
// Provides an in-memory store, a recording mailer and configurable
// permissions that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::field_definitions::{
    BaseFieldDefinitionProvider, FieldDefinition, MemoizedFieldDefinitions, StaticMemberForm,
};
use super::{BaseConfirmationMailer, BasePermissionService, BaseProfileStore, ListingWindow, ServerDeps};
use crate::common::auth::{AccessAction, AccessExtension, Actor, SiteCapability};
use crate::common::{GroupId, MemberId, ProfileFieldId, ProfilePageId, ProfileSectionId};
use crate::domains::member::{FieldChange, Member, PublicFieldSelections};
use crate::domains::profile_fields::models::profile_field::resolve_sort_order;
use crate::domains::profile_fields::{
    FieldSettings, NewProfileField, ProfileField, SystemFields, VisibilityResolver,
};
use crate::domains::profile_pages::{NotificationType, ProfilePage};
use crate::domains::profile_sections::{NewProfileSection, ProfileSection};

// =============================================================================
// In-memory Profile Store
// =============================================================================

#[derive(Default)]
struct StoreState {
    pages: Vec<ProfilePage>,
    page_groups: HashMap<ProfilePageId, Vec<GroupId>>,
    fields: Vec<ProfileField>,
    sections: Vec<ProfileSection>,
    members: Vec<Member>,
    member_groups: Vec<(MemberId, GroupId)>,
}

/// Keeps rows in insertion order so creation order breaks sort-order ties.
#[derive(Default)]
pub struct InMemoryProfileStore {
    state: Mutex<StoreState>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(
        &self,
        url_segment: &str,
        email_type: NotificationType,
        requires_approval: bool,
    ) -> ProfilePage {
        let page = ProfilePage {
            id: ProfilePageId::new(),
            title: url_segment.to_string(),
            url_segment: url_segment.to_string(),
            email_type,
            requires_approval,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().pages.push(page.clone());
        page
    }

    pub fn restrict_page_to_group(&self, page_id: ProfilePageId, group_id: GroupId) {
        self.state
            .lock()
            .unwrap()
            .page_groups
            .entry(page_id)
            .or_default()
            .push(group_id);
    }

    pub fn add_member(&self, member: Member) -> Member {
        self.state.lock().unwrap().members.push(member.clone());
        member
    }

    pub fn add_member_to_group(&self, member_id: MemberId, group_id: GroupId) {
        self.state
            .lock()
            .unwrap()
            .member_groups
            .push((member_id, group_id));
    }

    /// Current copy of a member, for assertions
    pub fn member(&self, id: MemberId) -> Option<Member> {
        self.state
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|member| member.id == id)
            .cloned()
    }

    pub fn field_count(&self) -> usize {
        self.state.lock().unwrap().fields.len()
    }

    fn with_member<T>(&self, id: MemberId, update: impl FnOnce(&mut Member) -> T) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        state.members.iter_mut().find(|member| member.id == id).map(update)
    }
}

fn in_groups(member_groups: &[(MemberId, GroupId)], id: MemberId, groups: &[GroupId]) -> bool {
    member_groups
        .iter()
        .any(|(member_id, group_id)| *member_id == id && groups.contains(group_id))
}

#[async_trait]
impl BaseProfileStore for InMemoryProfileStore {
    async fn find_page(&self, id: ProfilePageId) -> Result<Option<ProfilePage>> {
        let state = self.state.lock().unwrap();
        Ok(state.pages.iter().find(|page| page.id == id).cloned())
    }

    async fn page_groups(&self, id: ProfilePageId) -> Result<Vec<GroupId>> {
        let state = self.state.lock().unwrap();
        Ok(state.page_groups.get(&id).cloned().unwrap_or_default())
    }

    async fn fields_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileField>> {
        let state = self.state.lock().unwrap();
        let mut fields: Vec<_> = state
            .fields
            .iter()
            .filter(|field| field.profile_page_id == Some(page_id))
            .cloned()
            .collect();
        fields.sort_by_key(|field| field.sort_order);
        Ok(fields)
    }

    async fn find_field(&self, id: ProfileFieldId) -> Result<Option<ProfileField>> {
        let state = self.state.lock().unwrap();
        Ok(state.fields.iter().find(|field| field.id == id).cloned())
    }

    async fn insert_field(&self, new: NewProfileField) -> Result<ProfileField> {
        let mut state = self.state.lock().unwrap();
        let max = state.fields.iter().map(|field| field.sort_order).max();
        let requested = new.sort_order;
        let field = ProfileField::from_new(new, resolve_sort_order(requested, max));
        state.fields.push(field.clone());
        Ok(field)
    }

    async fn update_field(
        &self,
        id: ProfileFieldId,
        settings: &FieldSettings,
    ) -> Result<ProfileField> {
        let mut state = self.state.lock().unwrap();
        let field = state
            .fields
            .iter_mut()
            .find(|field| field.id == id)
            .ok_or_else(|| anyhow!("Profile field not found: {}", id))?;
        field.apply(settings);
        Ok(field.clone())
    }

    async fn delete_field(&self, id: ProfileFieldId) -> Result<()> {
        self.state.lock().unwrap().fields.retain(|field| field.id != id);
        Ok(())
    }

    async fn sections_for_page(&self, page_id: ProfilePageId) -> Result<Vec<ProfileSection>> {
        let state = self.state.lock().unwrap();
        let mut sections: Vec<_> = state
            .sections
            .iter()
            .filter(|section| section.parent_id == Some(page_id))
            .cloned()
            .collect();
        sections.sort_by_key(|section| section.sort_order);
        Ok(sections)
    }

    async fn find_section(&self, id: ProfileSectionId) -> Result<Option<ProfileSection>> {
        let state = self.state.lock().unwrap();
        Ok(state.sections.iter().find(|section| section.id == id).cloned())
    }

    async fn insert_section(&self, new: NewProfileSection) -> Result<ProfileSection> {
        let mut state = self.state.lock().unwrap();
        let max = state
            .sections
            .iter()
            .filter(|section| section.parent_id == new.parent_id)
            .map(|section| section.sort_order)
            .max();
        let sort_order = match new.sort_order {
            Some(sort) if sort != 0 => sort,
            _ => max.unwrap_or(0) + 1,
        };
        let section = ProfileSection::from_new(new, sort_order);
        state.sections.push(section.clone());
        Ok(section)
    }

    async fn rename_section(
        &self,
        id: ProfileSectionId,
        custom_title: Option<&str>,
    ) -> Result<ProfileSection> {
        let mut state = self.state.lock().unwrap();
        let section = state
            .sections
            .iter_mut()
            .find(|section| section.id == id)
            .ok_or_else(|| anyhow!("Profile section not found: {}", id))?;
        section.custom_title = custom_title.filter(|t| !t.is_empty()).map(str::to_string);
        Ok(section.clone())
    }

    async fn delete_section(&self, id: ProfileSectionId) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .sections
            .retain(|section| section.id != id);
        Ok(())
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.member(id))
    }

    async fn find_member_by_attribute(
        &self,
        member_field: &str,
        value: &str,
    ) -> Result<Option<Member>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .members
            .iter()
            .find(|member| {
                member
                    .attribute(member_field)
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(value))
            })
            .cloned())
    }

    async fn insert_member(&self, member: &Member) -> Result<Member> {
        let mut state = self.state.lock().unwrap();
        if state.members.iter().any(|existing| existing.id == member.id) {
            return Err(anyhow!("duplicate member id: {}", member.id));
        }
        state.members.push(member.clone());
        Ok(member.clone())
    }

    async fn members_for_listing(
        &self,
        groups: &[GroupId],
        window: ListingWindow,
    ) -> Result<(Vec<Member>, i64)> {
        let state = self.state.lock().unwrap();
        let listed: Vec<&Member> = state
            .members
            .iter()
            .filter(|member| groups.is_empty() || in_groups(&state.member_groups, member.id, groups))
            .collect();
        let total = listed.len() as i64;
        let page = listed
            .into_iter()
            .skip(window.offset.max(0) as usize)
            .take(window.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn member_in_groups(&self, id: MemberId, groups: &[GroupId]) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(in_groups(&state.member_groups, id, groups))
    }

    async fn set_needs_validation(
        &self,
        id: MemberId,
        value: bool,
    ) -> Result<Option<FieldChange<bool>>> {
        Ok(self.with_member(id, |member| {
            let before = std::mem::replace(&mut member.state.needs_validation, value);
            FieldChange {
                before,
                after: value,
            }
        }))
    }

    async fn set_needs_approval(
        &self,
        id: MemberId,
        value: bool,
    ) -> Result<Option<FieldChange<bool>>> {
        Ok(self.with_member(id, |member| {
            let before = std::mem::replace(&mut member.state.needs_approval, value);
            FieldChange {
                before,
                after: value,
            }
        }))
    }

    async fn set_public_fields(
        &self,
        id: MemberId,
        selections: &PublicFieldSelections,
    ) -> Result<()> {
        self.with_member(id, |member| member.state.public_fields = selections.clone())
            .ok_or_else(|| anyhow!("Member not found: {}", id))
    }
}

// =============================================================================
// Recording Mailer
// =============================================================================

pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<(ProfilePageId, MemberId)>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A mailer whose transport always fails (attempts are still recorded)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<(ProfilePageId, MemberId)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for RecordingMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseConfirmationMailer for RecordingMailer {
    async fn send(&self, page: &ProfilePage, member: &Member) -> Result<()> {
        self.sent.lock().unwrap().push((page.id, member.id));
        if self.fail {
            return Err(anyhow!("mail transport unavailable"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock Permissions
// =============================================================================

/// Admins hold every capability; pages allow whatever was not denied.
#[derive(Default)]
pub struct MockPermissions {
    site_wide_editors: Mutex<HashSet<MemberId>>,
    page_denials: Mutex<HashSet<AccessAction>>,
}

impl MockPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_site_wide_edit(self, member_id: MemberId) -> Self {
        self.site_wide_editors.lock().unwrap().insert(member_id);
        self
    }

    pub fn deny_on_pages(self, action: AccessAction) -> Self {
        self.page_denials.lock().unwrap().insert(action);
        self
    }
}

impl BasePermissionService for MockPermissions {
    fn has_capability(&self, actor: &Actor, capability: SiteCapability) -> bool {
        actor.is_admin()
            || (capability == SiteCapability::EditAllContent
                && self
                    .site_wide_editors
                    .lock()
                    .unwrap()
                    .contains(&actor.member_id()))
    }

    fn page_permits(
        &self,
        action: AccessAction,
        _actor: Option<&Actor>,
        _page: &ProfilePage,
    ) -> bool {
        !self.page_denials.lock().unwrap().contains(&action)
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<InMemoryProfileStore>,
    pub mailer: Arc<RecordingMailer>,
    pub permissions: Arc<MockPermissions>,
    pub member_form: StaticMemberForm,
    pub system_fields: SystemFields,
    pub access_extensions: Vec<Arc<dyn AccessExtension>>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryProfileStore::new()),
            mailer: Arc::new(RecordingMailer::new()),
            permissions: Arc::new(MockPermissions::new()),
            member_form: StaticMemberForm::default(),
            system_fields: SystemFields::default(),
            access_extensions: Vec::new(),
        }
    }

    /// Set a mock mailer
    pub fn mock_mailer(mut self, mailer: RecordingMailer) -> Self {
        self.mailer = Arc::new(mailer);
        self
    }

    /// Set mock permissions
    pub fn mock_permissions(mut self, permissions: MockPermissions) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    /// Add a definition to the member form
    pub fn with_member_field(mut self, field: FieldDefinition) -> Self {
        self.member_form = self.member_form.with_field(field);
        self
    }

    pub fn identifier_field(mut self, name: &str) -> Self {
        self.system_fields = SystemFields::new(name);
        self
    }

    pub fn with_access_extension(mut self, extension: Arc<dyn AccessExtension>) -> Self {
        self.access_extensions.push(extension);
        self
    }

    /// Convert to ServerDeps for use in activities
    pub fn into_server_deps(self) -> ServerDeps {
        let field_definitions: Arc<dyn BaseFieldDefinitionProvider> =
            Arc::new(MemoizedFieldDefinitions::new(self.member_form));

        let mut deps = ServerDeps::new(
            self.store,
            self.mailer,
            self.permissions,
            field_definitions,
            VisibilityResolver::new(self.system_fields),
        );
        for extension in self.access_extensions {
            deps = deps.with_access_extension(extension);
        }
        deps
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
