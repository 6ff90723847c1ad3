//! RolePrefixTable - Ordered role → prefix mapping
//!
//! Order encodes priority: the first entry whose role a member holds decides
//! the member's prefix and the section they are listed under in the panel.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::ids::RoleId;
use crate::domain::errors::DomainError;
use crate::domain::services::nickname::{is_structural_prefix, MAX_NICKNAME_LEN};

/// A single role entry of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePrefix {
    /// Role this entry applies to
    pub id: RoleId,
    /// Bracketed tag prepended to nicknames, e.g. `[A]` or `⭐[ADM]`
    pub prefix: String,
    /// Human-readable role name used as the panel section heading
    #[serde(default)]
    pub label: Option<String>,
}

impl RolePrefix {
    pub fn new(id: RoleId, prefix: impl Into<String>) -> Self {
        Self {
            id,
            prefix: prefix.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Section heading: prefix followed by the label when one is set
    pub fn heading(&self) -> String {
        match &self.label {
            Some(label) => format!("{} {}", self.prefix, label),
            None => self.prefix.clone(),
        }
    }
}

/// Validated, priority-ordered role prefix table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RolePrefixTable {
    entries: Vec<RolePrefix>,
}

impl RolePrefixTable {
    /// Build a table, rejecting entries that would break nickname resolution.
    ///
    /// A prefix must be structurally strippable and leave room for a space and
    /// at least one character of the base name.
    pub fn new(entries: Vec<RolePrefix>) -> Result<Self, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::Validation(
                "role prefix table must contain at least one role".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(DomainError::Validation(format!(
                    "role {} appears more than once in the prefix table",
                    entry.id
                )));
            }
            if !is_structural_prefix(&entry.prefix) {
                return Err(DomainError::Validation(format!(
                    "prefix {:?} for role {} must look like [TAG], optionally led by one symbol",
                    entry.prefix, entry.id
                )));
            }
            if entry.prefix.chars().count() > MAX_NICKNAME_LEN - 2 {
                return Err(DomainError::Validation(format!(
                    "prefix {:?} for role {} leaves no room for a name within {} characters",
                    entry.prefix, entry.id, MAX_NICKNAME_LEN
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Entries in priority order (highest first)
    pub fn iter(&self) -> impl Iterator<Item = &RolePrefix> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-priority entry among the given roles
    pub fn highest<'a>(&'a self, roles: &BTreeSet<RoleId>) -> Option<&'a RolePrefix> {
        self.entries.iter().find(|entry| roles.contains(&entry.id))
    }

    /// Whether the role is part of the hierarchy
    pub fn tracks(&self, role: RoleId) -> bool {
        self.entries.iter().any(|entry| entry.id == role)
    }

    /// Subset of `roles` that the table tracks
    pub fn tracked(&self, roles: &BTreeSet<RoleId>) -> BTreeSet<RoleId> {
        roles.iter().copied().filter(|r| self.tracks(*r)).collect()
    }
}

impl<'de> Deserialize<'de> for RolePrefixTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<RolePrefix>::deserialize(deserializer)?;
        RolePrefixTable::new(entries).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[u64]) -> BTreeSet<RoleId> {
        ids.iter().copied().map(RoleId).collect()
    }

    #[test]
    fn test_highest_follows_table_order() {
        let table = RolePrefixTable::new(vec![
            RolePrefix::new(RoleId(1), "[A]"),
            RolePrefix::new(RoleId(2), "[B]"),
        ])
        .unwrap();

        assert_eq!(table.highest(&roles(&[2, 1])).unwrap().prefix, "[A]");
        assert_eq!(table.highest(&roles(&[2, 9])).unwrap().prefix, "[B]");
        assert!(table.highest(&roles(&[9])).is_none());
    }

    #[test]
    fn test_rejects_duplicate_roles() {
        let err = RolePrefixTable::new(vec![
            RolePrefix::new(RoleId(1), "[A]"),
            RolePrefix::new(RoleId(1), "[B]"),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_rejects_unbracketed_prefix() {
        assert!(RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), "VIP")]).is_err());
        assert!(RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), "[A] x")]).is_err());
        assert!(RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), "⭐[A]")]).is_ok());
    }

    #[test]
    fn test_rejects_prefix_without_room_for_name() {
        let long = format!("[{}]", "X".repeat(29)); // 31 chars
        assert!(RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), long)]).is_err());

        let fits = format!("[{}]", "X".repeat(28)); // 30 chars
        assert!(RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), fits)]).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: RolePrefixTable = serde_json::from_value(serde_json::json!([
            { "id": 10, "prefix": "[A]", "label": "Admin" },
            { "id": 20, "prefix": "[B]" }
        ]))
        .unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.iter().next().unwrap().heading(), "[A] Admin");

        let bad: Result<RolePrefixTable, _> = serde_json::from_value(serde_json::json!([]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_tracked_filters_unknown_roles() {
        let table = RolePrefixTable::new(vec![RolePrefix::new(RoleId(1), "[A]")]).unwrap();
        assert_eq!(table.tracked(&roles(&[1, 5])), roles(&[1]));
    }
}
