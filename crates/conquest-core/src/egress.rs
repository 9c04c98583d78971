//! Outbound grid updates.
//!
//! The tick engine hands each [`GridUpdate`] to a [`GridPublisher`] and does
//! not wait on delivery. The observer implements the trait over a broadcast
//! channel; tests and headless runs use [`NoOpPublisher`].

use conquest_types::GridUpdate;

/// Receives at most one update per tick, and only when the grid changed.
pub trait GridPublisher: Send + Sync {
    /// Deliver `update` to whoever is listening. Must not block.
    fn publish(&self, update: &GridUpdate);
}

/// Drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPublisher;

impl GridPublisher for NoOpPublisher {
    fn publish(&self, _update: &GridUpdate) {}
}
