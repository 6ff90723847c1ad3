//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod ids;
mod role_prefix;

pub use ids::*;
pub use role_prefix::*;
