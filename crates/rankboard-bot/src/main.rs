//! Rankboard Bot
//!
//! Keeps member nicknames prefixed with their highest hierarchy role, renders
//! the hierarchy panel, runs the whitelist form and the status panel.

mod adapters;
mod config;
mod handlers;
mod routes;
mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Overrides};
use crate::handlers::{Handler, ShardManagerContainer};
use crate::routes::HealthState;

/// Rankboard Discord bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/rankboard.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Guild to manage (overrides config file)
    #[arg(long, env = "DISCORD_GUILD_ID")]
    guild_id: Option<u64>,

    /// SQLite database URL (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Keep-alive HTTP port (overrides config file)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

impl From<&Args> for Overrides {
    fn from(args: &Args) -> Self {
        Self {
            token: args.token.clone(),
            guild_id: args.guild_id,
            database_url: args.database_url.clone(),
            port: args.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rankboard_bot=info,rankboard=info,rankboard_integration_discord=info,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🏷️ Rankboard initializing...");

    let args = Args::parse();
    if !Path::new(&args.config).exists() {
        anyhow::bail!("Config file not found: {}", args.config);
    }
    let config = Config::from_file(&args.config)?.apply(Overrides::from(&args));
    config.validate()?;
    info!("Loaded config from {}", args.config);

    let pool = adapters::sqlite::connect(&config.database.url)
        .await
        .context("Failed to open database")?;
    info!("✅ Database migrations completed");

    let health = HealthState::new();
    let port = config.server.port;
    let server_state = health.clone();
    tokio::spawn(async move {
        if let Err(e) = routes::health::serve(server_state, port).await {
            error!("HTTP server error: {}", e);
        }
    });

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS | GatewayIntents::GUILD_MESSAGES;
    let config = Arc::new(config);
    let handler = Handler::new(config.clone(), pool, health);

    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;

    client
        .data
        .write()
        .await
        .insert::<ShardManagerContainer>(client.shard_manager.clone());

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(_) => {
                    tokio::signal::ctrl_c().await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("🚀 Starting Discord gateway connection...");
    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Discord bot stopped");
    Ok(())
}
