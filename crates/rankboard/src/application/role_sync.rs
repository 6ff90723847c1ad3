//! Role Sync Application Service (Use Case)
//!
//! One pass for a member: resolve their nickname from current roles, rename
//! when it differs, then re-render the hierarchy panel. Every failure is
//! logged and the pass continues.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::panel::PanelSlot;
use crate::domain::entities::PanelBody;
use crate::domain::errors::DomainError;
use crate::domain::services::{build_lookup, needs_rename, render_hierarchy, resolve_nickname};
use crate::domain::value_objects::{MemberId, MessageId, RolePrefixTable};
use crate::ports::{MemberGateway, PanelGateway};

/// What a nickname sync did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Renamed { from: String, to: String },
    Unchanged,
    /// Member is not managed (bot account)
    Skipped,
}

/// Application service keeping nicknames and the hierarchy panel in sync
pub struct RoleSync<G>
where
    G: MemberGateway + PanelGateway,
{
    gateway: Arc<G>,
    table: Arc<RolePrefixTable>,
    panel: Arc<PanelSlot<G>>,
}

impl<G> RoleSync<G>
where
    G: MemberGateway + PanelGateway,
{
    pub fn new(gateway: Arc<G>, table: Arc<RolePrefixTable>, panel: Arc<PanelSlot<G>>) -> Self {
        Self {
            gateway,
            table,
            panel,
        }
    }

    pub fn table(&self) -> &RolePrefixTable {
        &self.table
    }

    /// Apply the resolved nickname to a member if it differs
    pub async fn sync_nickname(&self, id: MemberId) -> Result<SyncOutcome, DomainError> {
        let member = self.gateway.member(id).await?;
        if member.is_bot {
            return Ok(SyncOutcome::Skipped);
        }

        let resolved = resolve_nickname(&member.display_name, &member.roles, &self.table);

        // Clearing a nickname that is not set is a no-op
        if resolved.is_empty() && member.nickname.is_none() {
            return Ok(SyncOutcome::Unchanged);
        }
        if !needs_rename(&member.display_name, &resolved) {
            return Ok(SyncOutcome::Unchanged);
        }

        self.gateway.rename(id, &resolved).await?;
        Ok(SyncOutcome::Renamed {
            from: member.display_name,
            to: resolved,
        })
    }

    /// Re-render the hierarchy panel from current guild membership
    pub async fn refresh_panel(&self) -> Result<MessageId, DomainError> {
        let members = self.gateway.members().await?;
        let guild_roles = self.gateway.guild_roles().await?;
        let membership = build_lookup(&members, &guild_roles);

        let panel = render_hierarchy(&self.table, |role| membership.members_of(role));
        debug!(
            sections = panel.sections.len(),
            listed = panel.member_count(),
            "Hierarchy rendered"
        );

        self.panel.reconcile(&PanelBody::Hierarchy(panel)).await
    }

    /// Full pass for one member. Never fails; problems are logged.
    pub async fn run_pass(&self, id: MemberId) {
        match self.sync_nickname(id).await {
            Ok(SyncOutcome::Renamed { from, to }) => {
                info!(member_id = %id, from = %from, to = %to, "✏️ Nickname updated");
            }
            Ok(outcome) => debug!(member_id = %id, ?outcome, "Nickname sync done"),
            Err(e) => warn!(member_id = %id, error = %e, "Nickname sync failed"),
        }

        self.run_panel_pass().await;
    }

    /// Panel-only pass. Never fails; problems are logged.
    pub async fn run_panel_pass(&self) {
        if let Err(e) = self.refresh_panel().await {
            warn!(channel_id = %self.panel.channel(), error = %e, "Hierarchy panel update failed");
        }
    }

    /// Resolve every member once, then render the panel. Used at startup.
    pub async fn sync_all(&self) -> usize {
        let members = match self.gateway.members().await {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, "Failed to list members for full sync");
                self.run_panel_pass().await;
                return 0;
            }
        };

        let mut renamed = 0;
        for member in members.iter().filter(|m| !m.is_bot) {
            match self.sync_nickname(member.id).await {
                Ok(SyncOutcome::Renamed { .. }) => renamed += 1,
                Ok(_) => {}
                Err(e) => warn!(member_id = %member.id, error = %e, "Nickname sync failed"),
            }
        }

        self.run_panel_pass().await;
        renamed
    }
}
