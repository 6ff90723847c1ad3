//! Rankboard Domain Library
//!
//! Core domain types and interfaces for the Rankboard guild bot.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Member, panels, WhitelistApplication)
//!   - `value_objects/`: Immutable value types (ids, RolePrefixTable)
//!   - `services/`: Pure functions (nickname resolution, hierarchy rendering)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `gateway`: Chat platform interfaces
//!   - `repositories/`: Data access interfaces
//!
//! - **Application** (`application/`): Use cases orchestrating ports
//!
//! # Usage
//!
//! ```rust,ignore
//! use rankboard::domain::{resolve_nickname, RolePrefixTable};
//!
//! let nick = resolve_nickname("John", &member.roles, &table);
//! ```

pub mod application;
pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use application::{
    reconcile, Debouncer, PanelSlot, PanelState, RoleChange, RoleChangeDispatcher, RoleSync,
    SyncOutcome, WhitelistService,
};
pub use domain::{
    build_lookup, needs_rename, render_hierarchy, resolve_nickname, strip_prefix, ChannelId,
    DomainError, HierarchyPanel, Member, MemberId, MessageId, PanelBody, PanelSection, RoleId,
    RolePrefix, RolePrefixTable, StatusReport, WhitelistApplication, WhitelistForm,
    MAX_NICKNAME_LEN,
};
pub use ports::{
    MemberGateway, MessageSummary, PanelGateway, PanelRepository, WhitelistRepository,
};
