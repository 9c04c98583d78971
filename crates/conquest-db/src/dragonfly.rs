//! `Dragonfly` (Redis-compatible) state store.
//!
//! Every record is a JSON string under the keys listed in [`crate::keys`].
//! Player creation uses `SET NX` so concurrent joins for the same id cannot
//! clobber each other. An accepted action writes its player and faction in
//! one `MULTI`/`EXEC` block.

use conquest_types::{Faction, FactionName, Grid, Player, PlayerId, QueuedAction};
use fred::prelude::*;
use fred::types::SetOptions;
use serde::Serialize;

use crate::error::DbError;
use crate::keys;
use crate::store::{StateStore, decode_record, parse_tick};

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]; cloning shares the connection.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL follows the Redis scheme: `redis://host:port` or
    /// `redis://host:port/db`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    /// Drop every key in the database. Used to reset between test runs.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), DbError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl StateStore for DragonflyPool {
    async fn get_player(&self, id: &PlayerId) -> Result<Option<Player>, DbError> {
        let key = keys::player_key(id);
        let raw = self.get_raw(&key).await?;
        Ok(decode_record(&key, raw))
    }

    async fn set_player(&self, player: &Player) -> Result<(), DbError> {
        self.set_json(&keys::player_key(&player.id), player).await
    }

    async fn register_player(&self, player: &Player) -> Result<bool, DbError> {
        let json = serde_json::to_string(player)?;
        let created: Option<String> = self
            .client
            .set(
                keys::player_key(&player.id),
                json.as_str(),
                None,
                Some(SetOptions::NX),
                false,
            )
            .await?;
        // The set entry is written even when the record already existed.
        let _: u64 = self
            .client
            .sadd(keys::PLAYERS_KEY, player.id.as_str())
            .await?;
        Ok(created.is_some())
    }

    async fn list_players(&self) -> Result<Vec<PlayerId>, DbError> {
        let members: Vec<String> = self.client.smembers(keys::PLAYERS_KEY).await?;
        let mut ids: Vec<PlayerId> = members.into_iter().map(PlayerId::from).collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_faction(&self, name: FactionName) -> Result<Option<Faction>, DbError> {
        let key = keys::faction_key(name);
        let raw = self.get_raw(&key).await?;
        Ok(decode_record(&key, raw))
    }

    async fn set_faction(&self, faction: &Faction) -> Result<(), DbError> {
        self.set_json(&keys::faction_key(faction.name), faction).await
    }

    async fn commit_action(&self, player: &Player, faction: &Faction) -> Result<(), DbError> {
        let player_json = serde_json::to_string(player)?;
        let faction_json = serde_json::to_string(faction)?;
        let trx = self.client.multi();
        let _: () = trx
            .set(
                keys::faction_key(faction.name),
                faction_json.as_str(),
                None,
                None,
                false,
            )
            .await?;
        let _: () = trx
            .set(
                keys::player_key(&player.id),
                player_json.as_str(),
                None,
                None,
                false,
            )
            .await?;
        let _: () = trx.exec(true).await?;
        Ok(())
    }

    async fn get_grid(&self) -> Result<Option<Grid>, DbError> {
        let raw = self.get_raw(keys::GRID_KEY).await?;
        Ok(decode_record(keys::GRID_KEY, raw))
    }

    async fn set_grid(&self, grid: &Grid) -> Result<(), DbError> {
        self.set_json(keys::GRID_KEY, grid).await
    }

    async fn push_action(&self, id: &PlayerId, action: &QueuedAction) -> Result<u64, DbError> {
        let json = serde_json::to_string(action)?;
        let len: u64 = self.client.rpush(keys::queue_key(id), json.as_str()).await?;
        Ok(len)
    }

    async fn pop_action(&self, id: &PlayerId) -> Result<Option<String>, DbError> {
        let head: Option<String> = self.client.lpop(keys::queue_key(id), None).await?;
        Ok(head)
    }

    async fn queue_len(&self, id: &PlayerId) -> Result<u64, DbError> {
        let len: u64 = self.client.llen(keys::queue_key(id)).await?;
        Ok(len)
    }

    async fn get_world_tick(&self) -> Result<u64, DbError> {
        let raw = self.get_raw(keys::TICK_KEY).await?;
        parse_tick(keys::TICK_KEY, raw)
    }

    async fn set_world_tick(&self, tick: u64) -> Result<(), DbError> {
        let _: () = self
            .client
            .set(keys::TICK_KEY, tick.to_string().as_str(), None, None, false)
            .await?;
        Ok(())
    }
}
