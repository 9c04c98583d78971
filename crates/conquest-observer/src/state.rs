//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the store handle, the broadcast channel for grid
//! updates, and the operator control state. It is also the engine's
//! [`GridPublisher`], so the same channel feeds every `WebSocket` client.

use std::sync::Arc;

use conquest_core::{GridPublisher, OperatorState};
use conquest_db::StateStore;
use conquest_types::GridUpdate;
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the broadcast channel for grid updates.
///
/// A subscriber that falls more than this many updates behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest.
const BROADCAST_CAPACITY: usize = 64;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
pub struct AppState<S> {
    /// Authoritative game state.
    pub store: S,
    /// Broadcast sender for grid updates.
    pub tx: broadcast::Sender<GridUpdate>,
    /// Shared operator control state (present when the simulation is running).
    pub operator_state: Option<Arc<OperatorState>>,
    /// AP granted to players created through the join endpoint.
    pub starting_ap: u64,
}

impl<S: StateStore> AppState<S> {
    /// Create application state over `store` with no operator attached.
    pub fn new(store: S, starting_ap: u64) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            store,
            tx,
            operator_state: None,
            starting_ap,
        }
    }

    /// Attach operator control state.
    #[must_use]
    pub fn with_operator(mut self, operator: Arc<OperatorState>) -> Self {
        self.operator_state = Some(operator);
        self
    }

    /// Subscribe to the grid update channel.
    pub fn subscribe(&self) -> broadcast::Receiver<GridUpdate> {
        self.tx.subscribe()
    }

    /// Send `update` to every connected client.
    ///
    /// Returns the number of receivers reached; 0 when nobody is listening.
    pub fn broadcast(&self, update: &GridUpdate) -> usize {
        self.tx.send(update.clone()).unwrap_or(0)
    }
}

impl<S: StateStore> GridPublisher for AppState<S> {
    fn publish(&self, update: &GridUpdate) {
        let receivers = self.broadcast(update);
        trace!(tick = update.tick, receivers, "Grid update broadcast");
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for AppState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("subscribers", &self.tx.receiver_count())
            .field("operator_state", &self.operator_state.is_some())
            .field("starting_ap", &self.starting_ap)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use conquest_db::MemoryStore;
    use conquest_types::{CellPos, Grid};

    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscribers() {
        let state = AppState::new(MemoryStore::new(), 100);
        let mut rx = state.subscribe();
        let update = GridUpdate {
            tick: 7,
            grid: Grid::new(2, 2).unwrap(),
            changed: Vec::new(),
            reverted: vec![CellPos { x: 1, y: 1 }],
        };

        state.publish(&update);

        assert_eq!(rx.recv().await.unwrap(), update);
    }

    #[test]
    fn broadcast_without_listeners_is_not_an_error() {
        let state = AppState::new(MemoryStore::new(), 100);
        let update = GridUpdate {
            tick: 1,
            grid: Grid::new(1, 1).unwrap(),
            changed: Vec::new(),
            reverted: Vec::new(),
        };
        assert_eq!(state.broadcast(&update), 0);
    }
}
