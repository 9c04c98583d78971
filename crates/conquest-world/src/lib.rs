//! Grid setup and territory rules for the Conquest simulation.
//!
//! # Modules
//!
//! - [`connectivity`] -- The per-tick reachability sweep that returns cells
//!   cut off from every faction stronghold to neutral.
//! - [`error`] -- Error types for grid construction.
//! - [`starting_grid`] -- Match setup: corner regions, strongholds, and
//!   empty faction records.

pub mod connectivity;
pub mod error;
pub mod starting_grid;

// Re-export primary types at crate root.
pub use connectivity::{connected_territory, enforce_connectivity};
pub use error::WorldError;
pub use starting_grid::{create_starting_grid, starting_factions};
