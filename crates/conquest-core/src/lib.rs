//! Tick engine, runner, ingress, and configuration for the Conquest
//! simulation.
//!
//! This crate owns the authoritative loop: it drains per-player action
//! queues, applies the rules from `conquest-rules`, runs the connectivity
//! pass from `conquest-world`, and publishes grid changes. Everything it
//! touches goes through the [`StateStore`](conquest_db::StateStore) seam.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `conquest-config.yaml`.
//! - [`tick`] -- The per-tick drain / resolve / connectivity / publish cycle.
//! - [`runner`] -- Fixed-interval loop around the tick engine.
//! - [`operator`] -- Pause, resume, speed, and stop controls.
//! - [`ingress`] -- Action shape checks, queue appends, and player joins.
//! - [`egress`] -- The [`GridPublisher`](egress::GridPublisher) seam.

pub mod config;
pub mod egress;
pub mod ingress;
pub mod operator;
pub mod runner;
pub mod tick;

pub use config::{ConfigError, SimulationConfig, StoreMode};
pub use egress::{GridPublisher, NoOpPublisher};
pub use ingress::{IngressError, JoinOutcome, join_player, parse_action, submit_action};
pub use operator::{OperatorState, RunMode, SimulationEndReason, SimulationStatus};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use tick::{EngineContext, TickEngine, TickError, TickSummary};
