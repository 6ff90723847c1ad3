//! Discord API client wrapper

use rankboard::DomainError;
use serenity::builder::{
    CreateChannel, CreateEmbed, CreateMessage, EditMember, EditMessage, GetMessages,
};
use serenity::http::{Http, HttpError};
use serenity::model::channel::{ChannelType, Message as SerenityMessage};
use serenity::model::guild::Member as SerenityMember;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Largest page the member list endpoint returns
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Map a serenity error onto the domain taxonomy
pub fn domain_error(context: &str, err: serenity::Error) -> DomainError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) = &err {
        match resp.status_code.as_u16() {
            404 => {
                return DomainError::NotFound {
                    entity_type: context.to_string(),
                    id: resp.url.to_string(),
                }
            }
            403 => return DomainError::Forbidden(format!("{context}: {}", resp.error.message)),
            _ => {}
        }
    }
    DomainError::ExternalService(format!("Discord API error ({context}): {err}"))
}

/// Discord API client
pub struct DiscordClient {
    http: Arc<Http>,
    current_user: OnceCell<UserId>,
}

impl DiscordClient {
    /// Wrap the HTTP client of a running gateway session
    pub fn from_http(http: Arc<Http>) -> Self {
        Self {
            http,
            current_user: OnceCell::new(),
        }
    }

    /// The bot's own user id
    pub async fn current_user_id(&self) -> Result<UserId, serenity::Error> {
        self.current_user
            .get_or_try_init(|| async {
                Ok::<_, serenity::Error>(self.http.get_current_user().await?.id)
            })
            .await
            .copied()
    }

    /// Get recent messages from a channel
    pub async fn get_messages(
        &self,
        channel_id: u64,
        limit: u8,
    ) -> Result<Vec<SerenityMessage>, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        debug!(channel_id = %channel_id, limit = %limit, "Fetching messages from Discord");

        let messages = channel
            .messages(&self.http, GetMessages::new().limit(limit))
            .await?;

        Ok(messages)
    }

    /// Send a message to a channel
    pub async fn send_message(
        &self,
        channel_id: u64,
        message: CreateMessage,
    ) -> Result<SerenityMessage, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        debug!(channel_id = %channel_id, "Sending message to Discord");

        let message = channel
            .send_message(&self.http, message)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to send Discord message"))?;

        Ok(message)
    }

    /// Send an embed to a channel
    pub async fn send_embed(
        &self,
        channel_id: u64,
        embed: CreateEmbed,
    ) -> Result<SerenityMessage, serenity::Error> {
        self.send_message(channel_id, CreateMessage::new().embed(embed))
            .await
    }

    /// Replace the embeds of an existing message
    pub async fn edit_embed(
        &self,
        channel_id: u64,
        message_id: u64,
        embed: CreateEmbed,
    ) -> Result<SerenityMessage, serenity::Error> {
        let channel = ChannelId::new(channel_id);
        debug!(channel_id = %channel_id, message_id = %message_id, "Editing Discord message");

        channel
            .edit_message(
                &self.http,
                MessageId::new(message_id),
                EditMessage::new().embed(embed),
            )
            .await
    }

    /// Fetch a guild member
    pub async fn member(
        &self,
        guild_id: GuildId,
        user_id: u64,
    ) -> Result<SerenityMember, serenity::Error> {
        guild_id.member(&self.http, UserId::new(user_id)).await
    }

    /// Set a member's nickname. An empty nickname resets it.
    pub async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: u64,
        nickname: &str,
    ) -> Result<(), serenity::Error> {
        debug!(guild_id = %guild_id, user_id = %user_id, nickname = %nickname, "Setting nickname");

        guild_id
            .edit_member(
                &self.http,
                UserId::new(user_id),
                EditMember::new().nickname(nickname),
            )
            .await?;

        Ok(())
    }

    /// Every member of the guild, following pagination
    pub async fn list_members(
        &self,
        guild_id: GuildId,
    ) -> Result<Vec<SerenityMember>, serenity::Error> {
        let mut all = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild_id
                .members(&self.http, Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let full = page.len() as u64 == MEMBER_PAGE_SIZE;
            after = page.last().map(|m| m.user.id);
            all.extend(page);

            if !full {
                break;
            }
        }

        debug!(guild_id = %guild_id, count = all.len(), "Listed guild members");
        Ok(all)
    }

    /// Roles defined in the guild
    pub async fn guild_roles(&self, guild_id: GuildId) -> Result<HashSet<RoleId>, serenity::Error> {
        Ok(guild_id.roles(&self.http).await?.into_keys().collect())
    }

    /// Find a text channel by name, creating it when missing
    pub async fn find_or_create_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<ChannelId, serenity::Error> {
        let channels = guild_id.channels(&self.http).await?;
        if let Some(channel) = channels
            .values()
            .find(|c| c.name == name && c.kind == ChannelType::Text)
        {
            return Ok(channel.id);
        }

        let channel = guild_id
            .create_channel(&self.http, CreateChannel::new(name).kind(ChannelType::Text))
            .await?;
        info!(guild_id = %guild_id, channel_id = %channel.id, name = %name, "📌 Channel created");

        Ok(channel.id)
    }
}
