//! Chat Platform Ports
//!
//! Abstract interface over the guild the bot manages. Implementations
//! (e.g. rankboard-integration-discord) translate these calls into
//! platform API requests and map failures onto [`DomainError`].

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::entities::{Member, PanelBody};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ChannelId, MemberId, MessageId, RoleId};

/// Read and rename guild members
#[async_trait]
pub trait MemberGateway: Send + Sync {
    /// Fetch a single member with current roles
    async fn member(&self, id: MemberId) -> Result<Member, DomainError>;

    /// Set the member's nickname. An empty name clears it.
    async fn rename(&self, id: MemberId, nickname: &str) -> Result<(), DomainError>;

    /// Every member of the guild
    async fn members(&self) -> Result<Vec<Member>, DomainError>;

    /// Roles currently defined in the guild
    async fn guild_roles(&self) -> Result<HashSet<RoleId>, DomainError>;
}

/// Summary of a channel message, enough to recognise an own panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: MessageId,
    /// Whether the bot itself authored the message
    pub from_self: bool,
    /// Title of the first embed, if any
    pub title: Option<String>,
}

/// Send and edit panel messages
#[async_trait]
pub trait PanelGateway: Send + Sync {
    /// Most recent messages of a channel, newest first
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, DomainError>;

    /// Post a new panel message
    async fn send_panel(&self, channel: ChannelId, body: &PanelBody)
        -> Result<MessageId, DomainError>;

    /// Replace the content of an existing panel message
    async fn edit_panel(
        &self,
        channel: ChannelId,
        message: MessageId,
        body: &PanelBody,
    ) -> Result<(), DomainError>;
}
