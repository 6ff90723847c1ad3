//! Domain Services
//!
//! Pure functions over domain types. No I/O.

pub mod hierarchy;
pub mod nickname;

pub use hierarchy::*;
pub use nickname::*;
