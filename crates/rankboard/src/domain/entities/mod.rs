//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Member: Guild member as seen by the bot
//! - Panel: Rendered hierarchy and status panels
//! - WhitelistApplication: Recorded whitelist form submission

mod member;
mod panel;
mod whitelist;

pub use member::*;
pub use panel::*;
pub use whitelist::*;
