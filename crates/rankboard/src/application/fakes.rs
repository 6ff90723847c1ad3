//! In-memory port implementations for application tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::domain::entities::{Member, PanelBody, WhitelistApplication};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ChannelId, MemberId, MessageId, RoleId};
use crate::ports::{
    MemberGateway, MessageSummary, PanelGateway, PanelRepository, WhitelistRepository,
};

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub from_self: bool,
    pub title: Option<String>,
    pub body: Option<PanelBody>,
}

#[derive(Default)]
struct GuildState {
    members: HashMap<MemberId, Member>,
    roles: HashSet<RoleId>,
    messages: Vec<StoredMessage>,
    next_id: u64,
    renames: Vec<(MemberId, String)>,
    sends: usize,
    edits: usize,
    fail_sends: bool,
    forbidden: HashSet<MemberId>,
}

/// A guild and its channels, kept in memory
#[derive(Default)]
pub struct FakeGuild {
    state: Mutex<GuildState>,
}

impl FakeGuild {
    pub fn new() -> Self {
        let guild = Self::default();
        guild.state.lock().unwrap().next_id = 1000;
        guild
    }

    pub fn with_roles(self, roles: &[u64]) -> Self {
        self.state
            .lock()
            .unwrap()
            .roles
            .extend(roles.iter().copied().map(RoleId));
        self
    }

    pub fn upsert_member(&self, member: Member) {
        self.state.lock().unwrap().members.insert(member.id, member);
    }

    pub fn remove_member(&self, id: MemberId) {
        self.state.lock().unwrap().members.remove(&id);
    }

    pub fn member_name(&self, id: MemberId) -> String {
        self.state.lock().unwrap().members[&id].display_name.clone()
    }

    pub fn forbid_rename(&self, id: MemberId) {
        self.state.lock().unwrap().forbidden.insert(id);
    }

    pub fn renames(&self) -> Vec<(MemberId, String)> {
        self.state.lock().unwrap().renames.clone()
    }

    pub fn sends(&self) -> usize {
        self.state.lock().unwrap().sends
    }

    pub fn edits(&self) -> usize {
        self.state.lock().unwrap().edits
    }

    pub fn set_send_failure(&self, fail: bool) {
        self.state.lock().unwrap().fail_sends = fail;
    }

    pub fn message_exists(&self, id: MessageId) -> bool {
        self.state.lock().unwrap().messages.iter().any(|m| m.id == id)
    }

    pub fn body_of(&self, id: MessageId) -> Option<PanelBody> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .find(|m| m.id == id)
            .and_then(|m| m.body.clone())
    }

    pub fn delete_message(&self, id: MessageId) {
        self.state.lock().unwrap().messages.retain(|m| m.id != id);
    }

    pub fn post_own_message(&self, channel: ChannelId, title: Option<&str>) -> MessageId {
        self.post(channel, true, title)
    }

    pub fn post_foreign_message(&self, channel: ChannelId, title: Option<&str>) -> MessageId {
        self.post(channel, false, title)
    }

    fn post(&self, channel: ChannelId, from_self: bool, title: Option<&str>) -> MessageId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = MessageId(state.next_id);
        state.messages.push(StoredMessage {
            id,
            channel,
            from_self,
            title: title.map(str::to_string),
            body: None,
        });
        id
    }
}

#[async_trait]
impl MemberGateway for FakeGuild {
    async fn member(&self, id: MemberId) -> Result<Member, DomainError> {
        self.state
            .lock()
            .unwrap()
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Member", id))
    }

    async fn rename(&self, id: MemberId, nickname: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.forbidden.contains(&id) {
            return Err(DomainError::Forbidden(format!("cannot rename {id}")));
        }
        let member = state
            .members
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Member", id))?;
        if nickname.is_empty() {
            member.nickname = None;
        } else {
            member.nickname = Some(nickname.to_string());
            member.display_name = nickname.to_string();
        }
        state.renames.push((id, nickname.to_string()));
        Ok(())
    }

    async fn members(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self.state.lock().unwrap().members.values().cloned().collect())
    }

    async fn guild_roles(&self) -> Result<HashSet<RoleId>, DomainError> {
        Ok(self.state.lock().unwrap().roles.clone())
    }
}

#[async_trait]
impl PanelGateway for FakeGuild {
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .iter()
            .rev()
            .filter(|m| m.channel == channel)
            .take(limit as usize)
            .map(|m| MessageSummary {
                id: m.id,
                from_self: m.from_self,
                title: m.title.clone(),
            })
            .collect())
    }

    async fn send_panel(
        &self,
        channel: ChannelId,
        body: &PanelBody,
    ) -> Result<MessageId, DomainError> {
        if self.state.lock().unwrap().fail_sends {
            return Err(DomainError::ExternalService("send failed".into()));
        }
        let id = self.post(channel, true, Some(body.title()));
        let mut state = self.state.lock().unwrap();
        state.sends += 1;
        if let Some(m) = state.messages.iter_mut().find(|m| m.id == id) {
            m.body = Some(body.clone());
        }
        Ok(id)
    }

    async fn edit_panel(
        &self,
        channel: ChannelId,
        message: MessageId,
        body: &PanelBody,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .messages
            .iter_mut()
            .find(|m| m.id == message && m.channel == channel)
            .ok_or_else(|| DomainError::not_found("Message", message))?;
        stored.title = Some(body.title().to_string());
        stored.body = Some(body.clone());
        state.edits += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPanelRepository {
    panels: Mutex<HashMap<(ChannelId, String), MessageId>>,
}

#[async_trait]
impl PanelRepository for MemoryPanelRepository {
    async fn find(&self, channel: ChannelId, kind: &str) -> Result<Option<MessageId>, DomainError> {
        let panels = self.panels.lock().unwrap();
        Ok(panels.get(&(channel, kind.to_string())).copied())
    }

    async fn save(
        &self,
        channel: ChannelId,
        kind: &str,
        message: MessageId,
    ) -> Result<(), DomainError> {
        let mut panels = self.panels.lock().unwrap();
        panels.insert((channel, kind.to_string()), message);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryWhitelistRepository {
    apps: Mutex<HashMap<MemberId, WhitelistApplication>>,
}

#[async_trait]
impl WhitelistRepository for MemoryWhitelistRepository {
    async fn save(&self, app: &WhitelistApplication) -> Result<WhitelistApplication, DomainError> {
        self.apps.lock().unwrap().insert(app.user_id, app.clone());
        Ok(app.clone())
    }

    async fn find_by_user(
        &self,
        user_id: MemberId,
    ) -> Result<Option<WhitelistApplication>, DomainError> {
        Ok(self.apps.lock().unwrap().get(&user_id).cloned())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.apps.lock().unwrap().len() as u64)
    }
}
