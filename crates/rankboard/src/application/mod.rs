//! Application Layer (Use Cases)
//!
//! Orchestrates domain services over the ports. Everything here is generic
//! over the port traits so it can run against the real platform adapter or
//! in-memory fakes.

mod debounce;
mod dispatcher;
mod panel;
mod role_sync;
mod whitelist;

#[cfg(test)]
pub(crate) mod fakes;

pub use debounce::*;
pub use dispatcher::*;
pub use panel::*;
pub use role_sync::*;
pub use whitelist::*;
