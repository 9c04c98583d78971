//! State store for the Conquest simulation.
//!
//! The tick engine, ingress, and observers only ever talk to the
//! [`StateStore`] trait. Two implementations ship:
//!
//! ```text
//! StateStore
//!     |
//!     +-- DragonflyPool  (fred client, production)
//!     +-- MemoryStore    (Arc<Mutex<..>>, tests and `memory` mode)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`StateStore`] trait
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) implementation
//! - [`memory`] -- In-memory implementation
//! - [`keys`] -- Key layout shared by both
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod keys;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use memory::MemoryStore;
pub use store::StateStore;
