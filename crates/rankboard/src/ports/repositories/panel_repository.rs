//! Panel Repository Port
//!
//! Remembers the panel message of each channel and panel kind across restarts.

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ChannelId, MessageId};

/// Repository interface for panel message ids
#[async_trait]
pub trait PanelRepository: Send + Sync {
    /// Last known message of the `kind` panel in a channel
    async fn find(&self, channel: ChannelId, kind: &str) -> Result<Option<MessageId>, DomainError>;

    /// Record the `kind` panel message of a channel (insert or replace)
    async fn save(
        &self,
        channel: ChannelId,
        kind: &str,
        message: MessageId,
    ) -> Result<(), DomainError>;
}
