//! Observer and ingress API server for the Conquest simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws?player_id=<id>`) that streams each
//!   [`GridUpdate`](conquest_types::GridUpdate) via
//!   [`tokio::sync::broadcast`] and accepts actions as text frames
//! - **REST endpoints** for reading the grid, players, and factions, for
//!   joining, and for enqueueing actions
//! - **Operator REST endpoints** for runtime control (pause, resume,
//!   speed, status, stop)
//!
//! # Architecture
//!
//! Reads go straight to the [`StateStore`](conquest_db::StateStore); the
//! observer keeps no copy of game state. Writes are limited to what
//! ingress is allowed to do: create players and append to queues. The tick
//! engine publishes through [`AppState`], which implements
//! [`GridPublisher`](conquest_core::GridPublisher) over the broadcast
//! channel.

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
