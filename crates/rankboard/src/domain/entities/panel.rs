//! Panels - Messages kept up to date in place
//!
//! A panel is rendered into exactly one message per channel. The title is how
//! the bot recognises its own panel when scanning channel history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::{MemberId, RoleId};

/// Title of the hierarchy panel message
pub const HIERARCHY_PANEL_TITLE: &str = "📜 Hierarquia";

/// Title of the status panel message
pub const STATUS_PANEL_TITLE: &str = "📊 Painel de Status do Bot";

/// Placeholder rendered for a role with nobody left to list
pub const NO_MEMBERS: &str = "no members";

/// One role section of the hierarchy panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSection {
    pub role_id: RoleId,
    pub heading: String,
    /// Members listed under this role, in display order
    pub members: Vec<MemberId>,
}

impl PanelSection {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Rendered hierarchy: sections in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPanel {
    pub sections: Vec<PanelSection>,
}

impl HierarchyPanel {
    /// Total number of listed members
    pub fn member_count(&self) -> usize {
        self.sections.iter().map(|s| s.members.len()).sum()
    }

    /// Section a member is listed under, if any
    pub fn section_of(&self, member: MemberId) -> Option<&PanelSection> {
        self.sections.iter().find(|s| s.members.contains(&member))
    }
}

impl fmt::Display for HierarchyPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}**", HIERARCHY_PANEL_TITLE)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "**{}**", section.heading)?;
            if section.is_empty() {
                writeln!(f, "{}", NO_MEMBERS)?;
            }
            for member in &section.members {
                writeln!(f, "<@{}>", member)?;
            }
        }
        Ok(())
    }
}

/// Bot status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub started_at: DateTime<Utc>,
    pub guild_count: usize,
    pub whitelist_count: u64,
    /// Gateway heartbeat latency, unknown until the first heartbeat ack
    #[serde(default)]
    pub latency_ms: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a panel message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    Hierarchy(HierarchyPanel),
    Status(StatusReport),
}

impl PanelBody {
    /// Stable key of the panel kind, one panel per kind and channel
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hierarchy(_) => "hierarchy",
            Self::Status(_) => "status",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Hierarchy(_) => HIERARCHY_PANEL_TITLE,
            Self::Status(_) => STATUS_PANEL_TITLE,
        }
    }
}
