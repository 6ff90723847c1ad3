//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod sqlite;

// Re-exports
pub use sqlite::{SqlitePanelRepository, SqliteWhitelistRepository};
