//! Hierarchy rendering
//!
//! Lists every member exactly once, under the highest-priority role they hold.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{HierarchyPanel, Member, PanelSection};
use crate::domain::value_objects::{MemberId, RoleId, RolePrefix, RolePrefixTable};

/// Render the hierarchy panel.
///
/// `lookup` returns the ordered members of a role, or `None` when the role
/// no longer exists in the guild (such roles are skipped).
pub fn render_hierarchy<F>(table: &RolePrefixTable, mut lookup: F) -> HierarchyPanel
where
    F: FnMut(RoleId) -> Option<Vec<MemberId>>,
{
    let mut assigned = HashSet::new();
    let mut sections = Vec::with_capacity(table.len());

    for entry in table.iter() {
        let Some(members) = lookup(entry.id) else {
            tracing::debug!(role_id = %entry.id, "Role missing from guild, skipping section");
            continue;
        };
        sections.push(render_section(entry, members, &mut assigned));
    }

    HierarchyPanel { sections }
}

fn render_section(
    entry: &RolePrefix,
    members: Vec<MemberId>,
    assigned: &mut HashSet<MemberId>,
) -> PanelSection {
    let members = members
        .into_iter()
        .filter(|id| assigned.insert(*id))
        .collect();

    PanelSection {
        role_id: entry.id,
        heading: entry.heading(),
        members,
    }
}

/// Role membership snapshot of a guild
#[derive(Debug, Clone, Default)]
pub struct RoleMembership {
    guild_roles: HashSet<RoleId>,
    by_role: HashMap<RoleId, Vec<MemberId>>,
}

impl RoleMembership {
    /// Ordered members holding `role`, `None` if the guild has no such role
    pub fn members_of(&self, role: RoleId) -> Option<Vec<MemberId>> {
        if !self.guild_roles.contains(&role) {
            return None;
        }
        Some(self.by_role.get(&role).cloned().unwrap_or_default())
    }
}

/// Group guild members by role, ordered by display name (case-insensitive) then id.
/// Bot accounts are left out.
pub fn build_lookup(members: &[Member], guild_roles: &HashSet<RoleId>) -> RoleMembership {
    let mut sorted: Vec<&Member> = members.iter().filter(|m| !m.is_bot).collect();
    sorted.sort_by_cached_key(|m| (m.display_name.to_lowercase(), m.id));

    let mut by_role: HashMap<RoleId, Vec<MemberId>> = HashMap::new();
    for member in sorted {
        for role in &member.roles {
            by_role.entry(*role).or_default().push(member.id);
        }
    }

    RoleMembership {
        guild_roles: guild_roles.clone(),
        by_role,
    }
}
