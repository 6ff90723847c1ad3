//! Panel reconciliation
//!
//! Keeps a single live panel message per channel and panel kind: edit in
//! place when the message is known, otherwise send once. A failed edit
//! (message deleted, permission revoked) falls back to a fresh send whose id
//! is adopted.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::entities::PanelBody;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ChannelId, MessageId};
use crate::ports::{PanelGateway, PanelRepository};

/// How many recent messages are scanned when looking for an own panel
pub const DISCOVERY_SCAN_LIMIT: u8 = 50;

/// Find the bot's own panel among the channel's recent messages
pub async fn discover<G>(
    gateway: &G,
    channel: ChannelId,
    title: &str,
) -> Result<Option<MessageId>, DomainError>
where
    G: PanelGateway + ?Sized,
{
    let messages = gateway
        .recent_messages(channel, DISCOVERY_SCAN_LIMIT)
        .await?;

    Ok(messages
        .into_iter()
        .find(|m| m.from_self && m.title.as_deref() == Some(title))
        .map(|m| m.id))
}

/// Edit `existing` in place, or send a new panel when unknown or the edit fails
pub async fn reconcile_known<G>(
    gateway: &G,
    channel: ChannelId,
    body: &PanelBody,
    existing: Option<MessageId>,
) -> Result<MessageId, DomainError>
where
    G: PanelGateway + ?Sized,
{
    if let Some(message) = existing {
        match gateway.edit_panel(channel, message, body).await {
            Ok(()) => {
                debug!(channel_id = %channel, message_id = %message, "Panel edited in place");
                return Ok(message);
            }
            Err(e) => {
                warn!(
                    channel_id = %channel,
                    message_id = %message,
                    error = %e,
                    "Panel edit failed, sending a fresh panel"
                );
            }
        }
    }

    let message = gateway.send_panel(channel, body).await?;
    info!(channel_id = %channel, message_id = %message, title = body.title(), "Panel sent");
    Ok(message)
}

/// Reconcile a panel, discovering the existing message when none is given.
///
/// Discovery failures are logged and treated as "no panel yet".
pub async fn reconcile<G>(
    gateway: &G,
    channel: ChannelId,
    body: &PanelBody,
    existing: Option<MessageId>,
) -> Result<MessageId, DomainError>
where
    G: PanelGateway + ?Sized,
{
    let existing = match existing {
        Some(id) => Some(id),
        None => discover(gateway, channel, body.title())
            .await
            .unwrap_or_else(|e| {
                warn!(channel_id = %channel, error = %e, "Panel discovery failed");
                None
            }),
    };

    reconcile_known(gateway, channel, body, existing).await
}

/// Lifecycle of a channel's panel message id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Nothing known yet, discovery pending
    Unknown,
    /// Found by scanning or remembered from a previous run, not yet confirmed
    Discovered(MessageId),
    /// Created or edited successfully by this process
    Active(MessageId),
}

impl PanelState {
    pub fn message_id(self) -> Option<MessageId> {
        match self {
            Self::Unknown => None,
            Self::Discovered(id) | Self::Active(id) => Some(id),
        }
    }
}

/// The panel of one channel
///
/// Serialises reconciles so two renders never race to create the message.
pub struct PanelSlot<G: PanelGateway> {
    gateway: Arc<G>,
    repo: Option<Arc<dyn PanelRepository>>,
    channel: ChannelId,
    state: Mutex<PanelState>,
}

impl<G: PanelGateway> PanelSlot<G> {
    pub fn new(gateway: Arc<G>, channel: ChannelId) -> Self {
        Self {
            gateway,
            repo: None,
            channel,
            state: Mutex::new(PanelState::Unknown),
        }
    }

    /// Remember the panel message across restarts
    pub fn with_repository(mut self, repo: Arc<dyn PanelRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub async fn state(&self) -> PanelState {
        *self.state.lock().await
    }

    /// Render `body` into the channel's panel message
    pub async fn reconcile(&self, body: &PanelBody) -> Result<MessageId, DomainError> {
        let mut state = self.state.lock().await;

        if *state == PanelState::Unknown {
            if let Some(id) = self.locate(body).await {
                *state = PanelState::Discovered(id);
            }
        }

        let previous = state.message_id();
        let result = reconcile_known(self.gateway.as_ref(), self.channel, body, previous).await;

        match result {
            Ok(message) => {
                *state = PanelState::Active(message);
                if previous != Some(message) {
                    self.remember(body.kind(), message).await;
                }
                Ok(message)
            }
            Err(e) => {
                // Both edit and send failed: the old id is not trustworthy anymore
                *state = PanelState::Unknown;
                Err(e)
            }
        }
    }

    async fn locate(&self, body: &PanelBody) -> Option<MessageId> {
        if let Some(repo) = &self.repo {
            match repo.find(self.channel, body.kind()).await {
                Ok(Some(id)) => {
                    debug!(channel_id = %self.channel, message_id = %id, "Panel id loaded from store");
                    return Some(id);
                }
                Ok(None) => {}
                Err(e) => warn!(channel_id = %self.channel, error = %e, "Failed to load panel id"),
            }
        }

        match discover(self.gateway.as_ref(), self.channel, body.title()).await {
            Ok(found) => {
                if let Some(id) = found {
                    info!(channel_id = %self.channel, message_id = %id, "Existing panel discovered");
                }
                found
            }
            Err(e) => {
                warn!(channel_id = %self.channel, error = %e, "Panel discovery failed");
                None
            }
        }
    }

    async fn remember(&self, kind: &str, message: MessageId) {
        if let Some(repo) = &self.repo {
            if let Err(e) = repo.save(self.channel, kind, message).await {
                warn!(channel_id = %self.channel, error = %e, "Failed to persist panel id");
            }
        }
    }
}
