//! Discord configuration

use serde::{Deserialize, Serialize};

/// Configuration for Discord integration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    #[serde(default)]
    pub token: String,
    /// Guild the bot manages. Falls back to the first guild the bot is in.
    #[serde(default)]
    pub guild_id: Option<u64>,
}
