//! Port implementations for Discord

use async_trait::async_trait;
use rankboard::{
    ChannelId, DomainError, Member, MemberGateway, MemberId, MessageId, MessageSummary, PanelBody,
    PanelGateway, RoleId, WhitelistApplication,
};
use serenity::model::guild::Member as SerenityMember;
use serenity::model::id::GuildId;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::client::{domain_error, DiscordClient};
use crate::embeds::{panel_embed, whitelist_result_embed};
use crate::whitelist::{prompt_message, PROMPT_CONTENT};

/// How far back the whitelist prompt is looked for
const PROMPT_SCAN_LIMIT: u8 = 50;

/// Discord integration implementing the guild ports for one guild
pub struct DiscordIntegration {
    client: DiscordClient,
    guild_id: GuildId,
}

impl DiscordIntegration {
    /// Create a new Discord integration
    pub fn new(client: DiscordClient, guild_id: GuildId) -> Self {
        Self { client, guild_id }
    }

    /// Resolve a channel name in the managed guild, creating it if needed
    pub async fn text_channel(&self, name: &str) -> Result<ChannelId, DomainError> {
        self.client
            .find_or_create_text_channel(self.guild_id, name)
            .await
            .map(|id| ChannelId(id.get()))
            .map_err(|e| domain_error("Channel", e))
    }

    /// Post the whitelist prompt unless the bot already posted one recently
    pub async fn ensure_whitelist_prompt(
        &self,
        channel: ChannelId,
    ) -> Result<MessageId, DomainError> {
        let me = self
            .client
            .current_user_id()
            .await
            .map_err(|e| domain_error("CurrentUser", e))?;
        let messages = self
            .client
            .get_messages(channel.get(), PROMPT_SCAN_LIMIT)
            .await
            .map_err(|e| domain_error("Channel", e))?;

        if let Some(existing) = messages
            .iter()
            .find(|m| m.author.id == me && m.content == PROMPT_CONTENT)
        {
            debug!(channel_id = %channel, message_id = %existing.id, "Whitelist prompt already present");
            return Ok(MessageId(existing.id.get()));
        }

        let message = self
            .client
            .send_message(channel.get(), prompt_message())
            .await
            .map_err(|e| domain_error("Channel", e))?;
        info!(channel_id = %channel, "📋 Whitelist prompt posted");

        Ok(MessageId(message.id.get()))
    }

    /// Post the result card of a whitelist submission
    pub async fn post_whitelist_result(
        &self,
        channel: ChannelId,
        app: &WhitelistApplication,
        avatar_url: Option<String>,
    ) -> Result<MessageId, DomainError> {
        let message = self
            .client
            .send_embed(channel.get(), whitelist_result_embed(app, avatar_url))
            .await
            .map_err(|e| domain_error("Channel", e))?;

        Ok(MessageId(message.id.get()))
    }
}

/// Convert a serenity guild member to the domain Member
pub fn convert_member(member: &SerenityMember) -> Member {
    Member {
        id: MemberId(member.user.id.get()),
        display_name: member.display_name().to_string(),
        nickname: member.nick.clone(),
        roles: member.roles.iter().map(|r| RoleId(r.get())).collect(),
        is_bot: member.user.bot,
    }
}

#[async_trait]
impl MemberGateway for DiscordIntegration {
    async fn member(&self, id: MemberId) -> Result<Member, DomainError> {
        let member = self
            .client
            .member(self.guild_id, id.get())
            .await
            .map_err(|e| domain_error("Member", e))?;

        Ok(convert_member(&member))
    }

    async fn rename(&self, id: MemberId, nickname: &str) -> Result<(), DomainError> {
        self.client
            .set_nickname(self.guild_id, id.get(), nickname)
            .await
            .map_err(|e| domain_error("Member", e))
    }

    async fn members(&self) -> Result<Vec<Member>, DomainError> {
        let members = self
            .client
            .list_members(self.guild_id)
            .await
            .map_err(|e| domain_error("Guild", e))?;

        Ok(members.iter().map(convert_member).collect())
    }

    async fn guild_roles(&self) -> Result<HashSet<RoleId>, DomainError> {
        let roles = self
            .client
            .guild_roles(self.guild_id)
            .await
            .map_err(|e| domain_error("Guild", e))?;

        Ok(roles.into_iter().map(|r| RoleId(r.get())).collect())
    }
}

#[async_trait]
impl PanelGateway for DiscordIntegration {
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, DomainError> {
        let me = self
            .client
            .current_user_id()
            .await
            .map_err(|e| domain_error("CurrentUser", e))?;
        let messages = self
            .client
            .get_messages(channel.get(), limit)
            .await
            .map_err(|e| domain_error("Channel", e))?;

        Ok(messages
            .iter()
            .map(|m| MessageSummary {
                id: MessageId(m.id.get()),
                from_self: m.author.id == me,
                title: m.embeds.first().and_then(|e| e.title.clone()),
            })
            .collect())
    }

    async fn send_panel(
        &self,
        channel: ChannelId,
        body: &PanelBody,
    ) -> Result<MessageId, DomainError> {
        let message = self
            .client
            .send_embed(channel.get(), panel_embed(body))
            .await
            .map_err(|e| domain_error("Channel", e))?;

        Ok(MessageId(message.id.get()))
    }

    async fn edit_panel(
        &self,
        channel: ChannelId,
        message: MessageId,
        body: &PanelBody,
    ) -> Result<(), DomainError> {
        self.client
            .edit_embed(channel.get(), message.get(), panel_embed(body))
            .await
            .map_err(|e| domain_error("Message", e))?;

        Ok(())
    }
}
