//! Action rules for the Conquest simulation.
//!
//! Pure decision logic: given the current grid, the acting player, their
//! faction, and one queued action, decide whether the action is accepted and
//! what it changes. Nothing in this crate touches the store.
//!
//! # Modules
//!
//! - [`costs`] -- AP cost table.
//! - [`validation`] -- Precondition checks that produce rejections.
//! - [`handlers`] -- State deltas for accepted actions.
//! - [`resolve`] -- Validate-then-execute entry point for the tick engine.
//! - [`error`] -- Failures that survive validation.

pub mod costs;
pub mod error;
pub mod handlers;
pub mod resolve;
pub mod validation;

pub use costs::{ATTACK_COST, ActionCosts, FORTIFY_COST, UPGRADE_COST};
pub use error::RulesError;
pub use handlers::StateDelta;
pub use resolve::{Resolution, resolve_action};
pub use validation::validate_action;
