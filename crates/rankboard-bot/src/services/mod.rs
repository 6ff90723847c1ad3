//! Background services

pub mod status;

pub use status::{LatencySource, StatusScheduler};
