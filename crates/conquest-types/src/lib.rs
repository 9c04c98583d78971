//! Shared type definitions for the Conquest territory simulation.
//!
//! This crate is the single source of truth for the records the tick engine
//! reads and writes and for the payloads exchanged with clients. Types flow
//! to `TypeScript` via `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Player identifier wrapper
//! - [`enums`] -- Factions, structures, action types, rejection reasons
//! - [`grid`] -- The rectangular cell matrix and its invariants
//! - [`entities`] -- Player and faction records
//! - [`actions`] -- Action payloads, queued actions, outcomes
//! - [`events`] -- Egress grid updates

pub mod actions;
pub mod entities;
pub mod enums;
pub mod events;
pub mod grid;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use actions::{
    ActionOutcome, ActionParameters, CellTarget, Donation, QueuedAction, UpgradeOrder,
};
pub use entities::{Faction, Player};
pub use enums::{ActionType, FactionName, RejectionReason, StructureKind, UnknownFaction};
pub use events::GridUpdate;
pub use grid::{Cell, CellPos, Grid, GridError};
pub use ids::PlayerId;
