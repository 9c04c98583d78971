//! Tick cycle: drain queues, apply rules, enforce connectivity, publish.
//!
//! Each tick runs these phases:
//!
//! 1. **Load** -- read the grid and the next tick number. A missing or
//!    undecodable grid aborts the tick.
//! 2. **Drain** -- for every registered player with queued actions, in id
//!    order: load the player once, then pop actions oldest-first. Each action
//!    is decoded, checked against a freshly loaded faction, and on
//!    acceptance the player and faction are committed together before the
//!    cell change is applied to the in-memory grid. A failed commit leaves
//!    both records as they were and the cell untouched.
//! 3. **Connectivity** -- revert owned cells cut off from every stronghold.
//! 4. **Publish** -- if any cell differs from the loaded grid, persist the
//!    grid once and hand one [`GridUpdate`] to the publisher.
//! 5. **Advance** -- persist the tick counter.
//!
//! Every store call is bounded by the configured I/O timeout. A failure
//! while draining one player skips that player; other players still run.
//!
//! Players run one after another and each accepted action is written back
//! before the next one is resolved, so faction records never see a lost
//! update from inside the engine.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use conquest_db::{DbError, StateStore};
use conquest_rules::{ActionCosts, Resolution, resolve_action};
use conquest_types::{GridError, GridUpdate, PlayerId, QueuedAction};
use conquest_world::enforce_connectivity;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::egress::GridPublisher;

/// Errors that abort a whole tick, or a single player within it.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A store call failed.
    #[error("store error during {operation}: {source}")]
    Store {
        /// Which call failed.
        operation: &'static str,
        /// The underlying store error.
        source: DbError,
    },

    /// A store call did not finish within the I/O timeout.
    #[error("store call {operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// Which call timed out.
        operation: &'static str,
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// No usable grid is stored.
    #[error("no grid in store")]
    NoGrid,

    /// A cell change did not fit the grid.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Players whose queues were drained.
    pub players_processed: u32,
    /// Players skipped because their record was missing or a store call
    /// failed.
    pub players_skipped: u32,
    /// Actions applied.
    pub actions_accepted: u32,
    /// Actions refused by the rules.
    pub actions_rejected: u32,
    /// Queue entries that could not be decoded and were discarded.
    pub actions_malformed: u32,
    /// Cells returned to neutral by the connectivity pass.
    pub cells_reverted: u32,
    /// Whether the grid was persisted and published.
    pub grid_changed: bool,
}

/// Everything the engine needs, passed in at construction.
#[derive(Clone)]
pub struct EngineContext<S> {
    /// Authoritative state.
    pub store: S,
    /// Where grid updates go.
    pub publisher: Arc<dyn GridPublisher>,
    /// Cost table for this match.
    pub costs: ActionCosts,
    /// Upper bound on each store call.
    pub io_timeout: Duration,
}

impl<S: std::fmt::Debug> std::fmt::Debug for EngineContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("store", &self.store)
            .field("costs", &self.costs)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

/// Runs ticks against a [`StateStore`].
#[derive(Debug, Clone)]
pub struct TickEngine<S> {
    ctx: EngineContext<S>,
}

impl<S: StateStore> TickEngine<S> {
    /// Build an engine from its context.
    pub const fn new(ctx: EngineContext<S>) -> Self {
        Self { ctx }
    }

    /// The store this engine reads and writes.
    pub const fn store(&self) -> &S {
        &self.ctx.store
    }

    /// Execute one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if the grid cannot be loaded or saved, or the
    /// tick counter cannot be read or written. Per-player failures are
    /// logged and counted in the summary instead.
    pub async fn run_tick(&self) -> Result<TickSummary, TickError> {
        let before = self
            .io("get_grid", self.ctx.store.get_grid())
            .await?
            .ok_or(TickError::NoGrid)?;
        let last = self
            .io("get_world_tick", self.ctx.store.get_world_tick())
            .await?;
        let mut summary = TickSummary {
            tick: last.saturating_add(1),
            ..TickSummary::default()
        };
        let mut grid = before.clone();

        let players = self.io("list_players", self.ctx.store.list_players()).await?;
        for id in &players {
            match self.io("queue_len", self.ctx.store.queue_len(id)).await {
                Ok(0) => continue,
                Ok(_) => {}
                Err(e) => {
                    warn!(player = %id, error = %e, "Skipping player");
                    summary.players_skipped = summary.players_skipped.saturating_add(1);
                    continue;
                }
            }
            match self.drain_player(id, &mut grid, &mut summary).await {
                Ok(true) => {
                    summary.players_processed = summary.players_processed.saturating_add(1);
                }
                Ok(false) => {
                    summary.players_skipped = summary.players_skipped.saturating_add(1);
                }
                Err(e) => {
                    warn!(player = %id, error = %e, "Skipping player");
                    summary.players_skipped = summary.players_skipped.saturating_add(1);
                }
            }
        }

        let reverted = enforce_connectivity(&mut grid);
        summary.cells_reverted = u32::try_from(reverted.len()).unwrap_or(u32::MAX);

        let changed = grid.changed_since(&before);
        if !changed.is_empty() {
            self.io("set_grid", self.ctx.store.set_grid(&grid)).await?;
            summary.grid_changed = true;
            self.ctx.publisher.publish(&GridUpdate {
                tick: summary.tick,
                grid,
                changed,
                reverted,
            });
        }

        self.io("set_world_tick", self.ctx.store.set_world_tick(summary.tick))
            .await?;

        info!(
            tick = summary.tick,
            players = summary.players_processed,
            skipped = summary.players_skipped,
            accepted = summary.actions_accepted,
            rejected = summary.actions_rejected,
            malformed = summary.actions_malformed,
            reverted = summary.cells_reverted,
            grid_changed = summary.grid_changed,
            "Tick complete"
        );
        Ok(summary)
    }

    /// Drain one player's queue into `grid`.
    ///
    /// Returns `Ok(false)` when the player record is missing; the queue is
    /// left untouched in that case.
    async fn drain_player(
        &self,
        id: &PlayerId,
        grid: &mut conquest_types::Grid,
        summary: &mut TickSummary,
    ) -> Result<bool, TickError> {
        let store = &self.ctx.store;
        let Some(mut player) = self.io("get_player", store.get_player(id)).await? else {
            warn!(player = %id, "Player record missing, queue retained");
            return Ok(false);
        };

        while let Some(raw) = self.io("pop_action", store.pop_action(id)).await? {
            let action: QueuedAction = match serde_json::from_str(&raw) {
                Ok(action) => action,
                Err(e) => {
                    warn!(player = %id, error = %e, "Discarding malformed queued action");
                    summary.actions_malformed = summary.actions_malformed.saturating_add(1);
                    continue;
                }
            };

            let faction = self
                .io("get_faction", store.get_faction(player.faction))
                .await?;
            let resolution = resolve_action(
                &action.parameters,
                &player,
                faction.as_ref(),
                grid,
                &self.ctx.costs,
            );

            match resolution {
                Resolution::Rejected(reason) => {
                    debug!(
                        player = %id,
                        action = ?action.parameters.action_type(),
                        ?reason,
                        "Action rejected"
                    );
                    summary.actions_rejected = summary.actions_rejected.saturating_add(1);
                }
                Resolution::Accepted(delta) => {
                    self.io(
                        "commit_action",
                        store.commit_action(&delta.player, &delta.faction),
                    )
                    .await?;
                    if let Some(cell) = delta.cell {
                        grid.replace_cell(cell)?;
                    }
                    debug!(player = %id, outcome = ?delta.outcome, "Action applied");
                    player = delta.player;
                    summary.actions_accepted = summary.actions_accepted.saturating_add(1);
                }
            }
        }
        Ok(true)
    }

    /// Run a store call under the I/O timeout.
    async fn io<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DbError>>,
    ) -> Result<T, TickError> {
        match tokio::time::timeout(self.ctx.io_timeout, call).await {
            Ok(result) => result.map_err(|source| TickError::Store { operation, source }),
            Err(_elapsed) => Err(TickError::Timeout {
                operation,
                timeout_ms: u64::try_from(self.ctx.io_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}
