//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod panel_repository;
mod whitelist_repository;

pub use panel_repository::*;
pub use whitelist_repository::*;
