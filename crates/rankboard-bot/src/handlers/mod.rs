//! Serenity event handler implementation
//!
//! Wires gateway events into the application services. Services are built on
//! the first `ready`, once the guild and its channels are known.

use chrono::{DateTime, Utc};
use rankboard::{
    ChannelId, DomainError, MemberId, PanelRepository, PanelSlot, RoleChange,
    RoleChangeDispatcher, RoleId, RoleSync, WhitelistApplication, WhitelistService,
};
use rankboard_integration_discord::whitelist::{
    ephemeral_reply, form_from_components, form_modal, FORM_MODAL_ID, START_BUTTON_ID,
};
use rankboard_integration_discord::{DiscordClient, DiscordIntegration};
use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::application::{ComponentInteraction, Interaction, ModalInteraction};
use serenity::model::event::GuildMemberUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member, UnavailableGuild};
use serenity::model::id::{GuildId, RoleId as SerenityRoleId};
use serenity::model::user::User;
use serenity::prelude::*;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::adapters::{SqlitePanelRepository, SqliteWhitelistRepository};
use crate::config::{ChannelSpec, Config};
use crate::routes::HealthState;
use crate::services::StatusScheduler;

type AppWhitelistService = WhitelistService<SqliteWhitelistRepository>;

const SUBMIT_OK: &str = "✅ Whitelist enviada com sucesso!";
const SUBMIT_FAILED: &str = "❌ Não foi possível registrar sua whitelist. Tente novamente.";

/// Client data slot holding the gateway's shard manager
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// Services bound to the managed guild
struct Runtime {
    guild_id: GuildId,
    dispatcher: RoleChangeDispatcher<DiscordIntegration>,
    whitelist: Option<WhitelistDesk>,
}

/// Whitelist flow state, present only when the flow is enabled
struct WhitelistDesk {
    integration: Arc<DiscordIntegration>,
    service: Arc<AppWhitelistService>,
    results_channel: ChannelId,
}

pub struct Handler {
    config: Arc<Config>,
    pool: SqlitePool,
    health: HealthState,
    started_at: DateTime<Utc>,
    guilds: Mutex<HashSet<GuildId>>,
    guild_count: Arc<AtomicUsize>,
    runtime: OnceCell<Runtime>,
}

impl Handler {
    pub fn new(config: Arc<Config>, pool: SqlitePool, health: HealthState) -> Self {
        Self {
            config,
            pool,
            health,
            started_at: Utc::now(),
            guilds: Mutex::new(HashSet::new()),
            guild_count: Arc::new(AtomicUsize::new(0)),
            runtime: OnceCell::new(),
        }
    }

    fn track_guilds(&self, update: impl FnOnce(&mut HashSet<GuildId>)) {
        let mut guilds = self.guilds.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut guilds);
        self.guild_count.store(guilds.len(), Ordering::Relaxed);
    }

    /// Build every service for the guild and kick off the startup passes
    async fn start(&self, ctx: &Context, guild_id: GuildId) -> Result<Runtime, DomainError> {
        let client = DiscordClient::from_http(ctx.http.clone());
        let integration = Arc::new(DiscordIntegration::new(client, guild_id));
        let panel_repo: Arc<dyn PanelRepository> =
            Arc::new(SqlitePanelRepository::new(self.pool.clone()));

        let hierarchy_channel = resolve_channel(&integration, &self.config.hierarchy.channel).await?;
        let slot = PanelSlot::new(integration.clone(), hierarchy_channel)
            .with_repository(panel_repo.clone());
        let sync = Arc::new(RoleSync::new(
            integration.clone(),
            Arc::new(self.config.hierarchy.roles.clone()),
            Arc::new(slot),
        ));
        let dispatcher = RoleChangeDispatcher::new(sync.clone(), self.config.hierarchy.debounce());
        info!(
            guild_id = %guild_id,
            channel_id = %hierarchy_channel,
            roles = self.config.hierarchy.roles.len(),
            "🏷️ Role hierarchy tracking enabled"
        );

        tokio::spawn(async move {
            let renamed = sync.sync_all().await;
            info!(renamed, "🔄 Startup nickname sync completed");
        });

        let whitelist_service = Arc::new(WhitelistService::new(Arc::new(
            SqliteWhitelistRepository::new(self.pool.clone()),
        )));

        let whitelist = if self.config.whitelist.enabled {
            let button_channel =
                resolve_channel(&integration, &self.config.whitelist.button_channel).await?;
            let results_channel =
                resolve_channel(&integration, &self.config.whitelist.results_channel).await?;

            if let Err(e) = integration.ensure_whitelist_prompt(button_channel).await {
                warn!(channel_id = %button_channel, error = %e, "Failed to post whitelist prompt");
            }
            info!(channel_id = %results_channel, "📋 Whitelist flow enabled");

            Some(WhitelistDesk {
                integration: integration.clone(),
                service: whitelist_service.clone(),
                results_channel,
            })
        } else {
            None
        };

        if self.config.status.enabled {
            let status_channel = resolve_channel(&integration, &self.config.status.channel).await?;
            let mut scheduler = StatusScheduler::new(
                PanelSlot::new(integration.clone(), status_channel).with_repository(panel_repo),
                whitelist_service,
                self.guild_count.clone(),
                self.started_at,
                self.config.status.interval(),
            );
            match ctx.data.read().await.get::<ShardManagerContainer>() {
                Some(manager) => scheduler = scheduler.with_latency(manager.clone()),
                None => warn!("Shard manager unavailable, status ping will be blank"),
            }
            scheduler.start();
        }

        Ok(Runtime {
            guild_id,
            dispatcher,
            whitelist,
        })
    }

    /// Runtime for events of `guild_id`, if it is the managed guild
    fn runtime_for(&self, guild_id: Option<GuildId>) -> Option<&Runtime> {
        self.runtime
            .get()
            .filter(|runtime| guild_id == Some(runtime.guild_id))
    }

    async fn open_form(&self, ctx: &Context, component: &ComponentInteraction) {
        let enabled = self
            .runtime_for(component.guild_id)
            .is_some_and(|runtime| runtime.whitelist.is_some());
        if !enabled {
            return;
        }

        if let Err(e) = component.create_response(ctx, form_modal()).await {
            error!(user_id = %component.user.id, error = %e, "Failed to open whitelist form");
        }
    }

    async fn submit_form(&self, ctx: &Context, modal: &ModalInteraction) {
        let Some(desk) = self
            .runtime_for(modal.guild_id)
            .and_then(|runtime| runtime.whitelist.as_ref())
        else {
            return;
        };

        let form = form_from_components(&modal.data.components);
        let result = desk
            .service
            .submit(MemberId(modal.user.id.get()), form)
            .await;

        // Interactions must be acknowledged within three seconds
        let reply = submission_reply(&result);
        if let Err(e) = modal.create_response(ctx, ephemeral_reply(reply)).await {
            error!(user_id = %modal.user.id, error = %e, "Failed to reply to whitelist submission");
        }

        if let Ok(app) = &result {
            if let Err(e) = desk
                .integration
                .post_whitelist_result(desk.results_channel, app, Some(modal.user.face()))
                .await
            {
                error!(user_id = %app.user_id, error = %e, "Failed to post whitelist result");
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🤖 Discord bot connected as {}", ready.user.name);
        self.health.set_bot_user(ready.user.name.clone()).await;

        let ready_guilds: Vec<GuildId> = ready.guilds.iter().map(|g| g.id).collect();
        self.track_guilds(|guilds| guilds.extend(ready_guilds.iter().copied()));

        let Some(guild_id) = pick_guild(self.config.discord.guild_id, &ready_guilds) else {
            error!("❌ No guild to manage: set [discord].guild_id or invite the bot to a guild");
            return;
        };

        if let Err(e) = self
            .runtime
            .get_or_try_init(|| self.start(&ctx, guild_id))
            .await
        {
            error!(guild_id = %guild_id, error = %e, "❌ Failed to start guild services");
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        self.track_guilds(|guilds| {
            guilds.insert(guild.id);
        });
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // An outage also arrives as a delete, flagged unavailable
        if incomplete.unavailable {
            return;
        }
        self.track_guilds(|guilds| {
            guilds.remove(&incomplete.id);
        });
    }

    async fn guild_member_update(
        &self,
        _ctx: Context,
        old_if_available: Option<Member>,
        _new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        let Some(runtime) = self.runtime_for(Some(event.guild_id)) else {
            return;
        };

        let old_roles = old_if_available.as_ref().map(|m| m.roles.as_slice());
        let change = role_change(event.user.id.get(), &event.roles, old_roles);
        if runtime.dispatcher.handle(change) {
            debug!(user_id = %event.user.id, "Role sync scheduled");
        }
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        if let Some(runtime) = self.runtime_for(Some(guild_id)) {
            runtime.dispatcher.handle_departure(MemberId(user.id.get()));
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) if component.data.custom_id == START_BUTTON_ID => {
                self.open_form(&ctx, &component).await;
            }
            Interaction::Modal(modal) if modal.data.custom_id == FORM_MODAL_ID => {
                self.submit_form(&ctx, &modal).await;
            }
            _ => {}
        }
    }
}

/// Resolve a configured channel to an id, creating named channels on demand
async fn resolve_channel(
    integration: &DiscordIntegration,
    spec: &ChannelSpec,
) -> Result<ChannelId, DomainError> {
    debug!(channel = %spec, "Resolving channel");
    if let Some(id) = spec.id() {
        return Ok(ChannelId(id));
    }
    match spec {
        ChannelSpec::Name(name) => integration.text_channel(name).await,
        ChannelSpec::Id(id) => Ok(ChannelId(*id)),
    }
}

/// Configured guild first, otherwise the first guild from Ready
fn pick_guild(configured: Option<u64>, ready_guilds: &[GuildId]) -> Option<GuildId> {
    configured
        .map(GuildId::new)
        .or_else(|| ready_guilds.first().copied())
}

fn role_change(
    user_id: u64,
    roles: &[SerenityRoleId],
    old_roles: Option<&[SerenityRoleId]>,
) -> RoleChange {
    let convert = |roles: &[SerenityRoleId]| -> Vec<RoleId> {
        roles.iter().map(|r| RoleId(r.get())).collect()
    };

    let change = RoleChange::new(MemberId(user_id), convert(roles));
    match old_roles {
        Some(old) => change.with_old_roles(convert(old)),
        None => change,
    }
}

/// Ephemeral text shown to the submitter
fn submission_reply(result: &Result<WhitelistApplication, DomainError>) -> String {
    match result {
        Ok(_) => SUBMIT_OK.to_string(),
        Err(DomainError::Validation(message)) => format!("❌ {message}"),
        Err(e) => {
            error!(error = %e, "Failed to record whitelist application");
            SUBMIT_FAILED.to_string()
        }
    }
}
