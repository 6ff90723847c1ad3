//! Configuration management for rankboard-bot
//!
//! Settings live in a TOML file (`config/rankboard.toml` by default). Secrets
//! and deployment values can be overridden from the environment or the CLI.

use anyhow::{bail, Context, Result};
use rankboard::RolePrefixTable;
use rankboard_integration_discord::DiscordConfig;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    pub hierarchy: HierarchyConfig,
    #[serde(default)]
    pub whitelist: WhitelistConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// A channel given either by snowflake id or by name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    Id(u64),
    Name(String),
}

impl ChannelSpec {
    /// Numeric id, also accepted when written as a quoted string
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Name(name) => name.parse().ok(),
        }
    }
}

impl fmt::Display for ChannelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "#{name}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default = "default_hierarchy_channel")]
    pub channel: ChannelSpec,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Role entries in priority order, highest first
    pub roles: RolePrefixTable,
}

impl HierarchyConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_button_channel")]
    pub button_channel: ChannelSpec,
    #[serde(default = "default_results_channel")]
    pub results_channel: ChannelSpec,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            button_channel: default_button_channel(),
            results_channel: default_results_channel(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_status_channel")]
    pub channel: ChannelSpec,
    #[serde(default = "default_status_interval")]
    pub interval_secs: u64,
}

impl StatusConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: default_status_channel(),
            interval_secs: default_status_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Values that take precedence over the file (environment / CLI)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub guild_id: Option<u64>,
    pub database_url: Option<String>,
    pub port: Option<u16>,
}

fn default_hierarchy_channel() -> ChannelSpec {
    ChannelSpec::Name("hierarquia".to_string())
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_button_channel() -> ChannelSpec {
    ChannelSpec::Name("whitelist-botao".to_string())
}

fn default_results_channel() -> ChannelSpec {
    ChannelSpec::Name("whitelist-resultados".to_string())
}

fn default_status_channel() -> ChannelSpec {
    ChannelSpec::Name("bot-logs".to_string())
}

fn default_status_interval() -> u64 {
    300
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite://rankboard.db?mode=rwc".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment / CLI overrides
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(token) = overrides.token {
            self.discord.token = token;
        }
        if let Some(guild_id) = overrides.guild_id {
            self.discord.guild_id = Some(guild_id);
        }
        if let Some(url) = overrides.database_url {
            self.database.url = url;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        self
    }

    /// Checks that cannot be expressed in the serde layer
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            bail!("Discord token missing: set [discord].token or DISCORD_TOKEN");
        }
        if self.status.enabled && self.status.interval_secs == 0 {
            bail!("[status].interval_secs must be greater than zero");
        }
        Ok(())
    }
}
