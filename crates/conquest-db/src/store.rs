//! The storage seam the tick engine and ingress are written against.

use std::future::Future;

use conquest_types::{Faction, FactionName, Grid, Player, PlayerId, QueuedAction};
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Key/value state shared by the tick engine, ingress, and observers.
///
/// Implementations must keep per-player action queues FIFO and must list
/// players in ascending id order so ticks process players deterministically.
pub trait StateStore: Clone + Send + Sync + 'static {
    /// Load a player. Missing or undecodable records read as `None`.
    fn get_player(
        &self,
        id: &PlayerId,
    ) -> impl Future<Output = Result<Option<Player>, DbError>> + Send;

    /// Overwrite a player record.
    fn set_player(&self, player: &Player) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Create a player if the id is unused and add it to the player set.
    ///
    /// Returns `false` without writing if the id already exists.
    fn register_player(
        &self,
        player: &Player,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Every registered player id, ascending.
    fn list_players(&self) -> impl Future<Output = Result<Vec<PlayerId>, DbError>> + Send;

    /// Load a faction. Missing or undecodable records read as `None`.
    fn get_faction(
        &self,
        name: FactionName,
    ) -> impl Future<Output = Result<Option<Faction>, DbError>> + Send;

    /// Overwrite a faction record.
    fn set_faction(&self, faction: &Faction) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Write the acting player and their faction as one unit.
    ///
    /// Either both records are stored or neither is, so AP moved between
    /// the two is never counted twice or lost.
    fn commit_action(
        &self,
        player: &Player,
        faction: &Faction,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Load the grid. Missing or undecodable grids read as `None`.
    fn get_grid(&self) -> impl Future<Output = Result<Option<Grid>, DbError>> + Send;

    /// Overwrite the grid.
    fn set_grid(&self, grid: &Grid) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Append to the tail of a player's queue. Returns the new length.
    fn push_action(
        &self,
        id: &PlayerId,
        action: &QueuedAction,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Remove and return the head of a player's queue, undecoded.
    fn pop_action(
        &self,
        id: &PlayerId,
    ) -> impl Future<Output = Result<Option<String>, DbError>> + Send;

    /// Number of actions waiting in a player's queue.
    fn queue_len(&self, id: &PlayerId) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Last completed tick, `0` if none has run.
    fn get_world_tick(&self) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Record the last completed tick.
    fn set_world_tick(&self, tick: u64) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Decode a stored JSON record, treating garbage as absent.
pub(crate) fn decode_record<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored record");
            None
        }
    }
}

/// Parse the `world:tick` counter.
pub(crate) fn parse_tick(key: &str, raw: Option<String>) -> Result<u64, DbError> {
    raw.map_or(Ok(0), |s| {
        s.parse::<u64>().map_err(|e| DbError::InvalidValue {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    })
}
