//! Nickname resolution
//!
//! Computes the display name a member should carry given the roles they hold.
//! Any previously applied prefix is removed structurally (a leading `[...]`
//! token, optionally preceded by one symbol), so switching from one rank to
//! another never needs to know which prefix was applied before.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::value_objects::{RoleId, RolePrefixTable};

/// Platform limit on guild nicknames, in characters
pub const MAX_NICKNAME_LEN: usize = 32;

const MARKER: &str = r"[^\s\[]?\x{FE0F}?\[[^\]]*\]";

fn leading_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^{MARKER}(?:\s+|$)")).expect("valid marker regex"))
}

fn whole_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^{MARKER}$")).expect("valid marker regex"))
}

/// Whether `prefix` is a bare structural marker that [`strip_prefix`] removes
pub fn is_structural_prefix(prefix: &str) -> bool {
    whole_marker().is_match(prefix)
}

/// Remove one leading prefix marker and surrounding whitespace
pub fn strip_prefix(name: &str) -> &str {
    let rest = match leading_marker().find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    };
    rest.trim()
}

/// Resolve the nickname for a member holding `roles`.
///
/// The highest-priority held role's prefix is applied; without one the bare
/// name is returned. The result never exceeds [`MAX_NICKNAME_LEN`] characters
/// and only the base name is ever shortened. An empty result means the
/// nickname should be cleared.
pub fn resolve_nickname(
    current_name: &str,
    roles: &BTreeSet<RoleId>,
    table: &RolePrefixTable,
) -> String {
    let base = strip_prefix(current_name);

    let Some(entry) = table.highest(roles) else {
        return truncate_chars(base, MAX_NICKNAME_LEN).to_string();
    };

    let prefix = entry.prefix.as_str();
    if base.is_empty() {
        return prefix.to_string();
    }

    let budget = MAX_NICKNAME_LEN.saturating_sub(prefix.chars().count() + 1);
    let base = truncate_chars(base, budget);
    if base.is_empty() {
        return prefix.to_string();
    }

    format!("{prefix} {base}")
}

/// Whether applying `resolved` would change anything
pub fn needs_rename(current_name: &str, resolved: &str) -> bool {
    current_name != resolved
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end(),
        None => s,
    }
}
