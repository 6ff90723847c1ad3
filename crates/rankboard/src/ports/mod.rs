//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the domain layer
//! interacts with external systems (chat platform, repositories).
//!
//! Implementations of these traits live in the infrastructure layer.

pub mod gateway;
pub mod repositories;

// Re-exports
pub use gateway::*;
pub use repositories::*;
