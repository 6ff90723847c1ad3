//! Discord Integration for Rankboard
//!
//! This crate provides the Discord side of the Rankboard ports: member reads
//! and renames, panel messages, and the whitelist form components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rankboard_integration_discord::{DiscordClient, DiscordIntegration};
//!
//! // inside an event handler, reusing the gateway's HTTP client
//! let client = DiscordClient::from_http(ctx.http.clone());
//! let integration = DiscordIntegration::new(client, GuildId::new(1234));
//! ```

mod client;
mod config;
mod embeds;
mod integration;
pub mod whitelist;

pub use client::{domain_error, DiscordClient};
pub use config::DiscordConfig;
pub use embeds::{hierarchy_embed, panel_embed, status_embed, whitelist_result_embed};
pub use integration::{convert_member, DiscordIntegration};
