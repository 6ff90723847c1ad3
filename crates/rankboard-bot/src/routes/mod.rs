//! HTTP routes of the keep-alive server

pub mod health;

pub use health::HealthState;
