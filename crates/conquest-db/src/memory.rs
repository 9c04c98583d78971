//! In-process state store.
//!
//! Mirrors the `Dragonfly` key layout (strings, lists, sets of JSON) behind a
//! single async mutex. Backs the `memory` store mode and every engine test.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use conquest_types::{Faction, FactionName, Grid, Player, PlayerId, QueuedAction};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::DbError;
use crate::keys;
use crate::store::{StateStore, decode_record, parse_tick};

#[derive(Debug, Default)]
struct Keyspace {
    strings: BTreeMap<String, String>,
    lists: BTreeMap<String, VecDeque<String>>,
    sets: BTreeMap<String, BTreeSet<String>>,
}

/// A [`StateStore`] held entirely in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Keyspace>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_json<T: Serialize + Sync>(&self, key: String, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        self.inner.lock().await.strings.insert(key, json);
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.lock().await.strings.get(key).cloned()
    }

    /// Write a raw string value, bypassing encoding.
    pub async fn put_raw(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .await
            .strings
            .insert(key.to_owned(), value.to_owned());
    }

    /// Append a raw entry to a player's queue, bypassing encoding.
    pub async fn push_raw_action(&self, id: &PlayerId, raw: &str) {
        self.inner
            .lock()
            .await
            .lists
            .entry(keys::queue_key(id))
            .or_default()
            .push_back(raw.to_owned());
    }
}

impl StateStore for MemoryStore {
    async fn get_player(&self, id: &PlayerId) -> Result<Option<Player>, DbError> {
        let key = keys::player_key(id);
        let raw = self.get_raw(&key).await;
        Ok(decode_record(&key, raw))
    }

    async fn set_player(&self, player: &Player) -> Result<(), DbError> {
        self.set_json(keys::player_key(&player.id), player).await
    }

    async fn register_player(&self, player: &Player) -> Result<bool, DbError> {
        let json = serde_json::to_string(player)?;
        let mut space = self.inner.lock().await;
        let key = keys::player_key(&player.id);
        let created = !space.strings.contains_key(&key);
        if created {
            space.strings.insert(key, json);
        }
        space
            .sets
            .entry(keys::PLAYERS_KEY.to_owned())
            .or_default()
            .insert(player.id.as_str().to_owned());
        Ok(created)
    }

    async fn list_players(&self) -> Result<Vec<PlayerId>, DbError> {
        let space = self.inner.lock().await;
        Ok(space
            .sets
            .get(keys::PLAYERS_KEY)
            .map(|members| members.iter().map(|m| PlayerId::from(m.as_str())).collect())
            .unwrap_or_default())
    }

    async fn get_faction(&self, name: FactionName) -> Result<Option<Faction>, DbError> {
        let key = keys::faction_key(name);
        let raw = self.get_raw(&key).await;
        Ok(decode_record(&key, raw))
    }

    async fn set_faction(&self, faction: &Faction) -> Result<(), DbError> {
        self.set_json(keys::faction_key(faction.name), faction).await
    }

    async fn commit_action(&self, player: &Player, faction: &Faction) -> Result<(), DbError> {
        let player_json = serde_json::to_string(player)?;
        let faction_json = serde_json::to_string(faction)?;
        let mut space = self.inner.lock().await;
        space
            .strings
            .insert(keys::faction_key(faction.name), faction_json);
        space.strings.insert(keys::player_key(&player.id), player_json);
        Ok(())
    }

    async fn get_grid(&self) -> Result<Option<Grid>, DbError> {
        let raw = self.get_raw(keys::GRID_KEY).await;
        Ok(decode_record(keys::GRID_KEY, raw))
    }

    async fn set_grid(&self, grid: &Grid) -> Result<(), DbError> {
        self.set_json(keys::GRID_KEY.to_owned(), grid).await
    }

    async fn push_action(&self, id: &PlayerId, action: &QueuedAction) -> Result<u64, DbError> {
        let json = serde_json::to_string(action)?;
        let mut space = self.inner.lock().await;
        let queue = space.lists.entry(keys::queue_key(id)).or_default();
        queue.push_back(json);
        Ok(u64::try_from(queue.len()).unwrap_or(u64::MAX))
    }

    async fn pop_action(&self, id: &PlayerId) -> Result<Option<String>, DbError> {
        let mut space = self.inner.lock().await;
        let key = keys::queue_key(id);
        let head = space.lists.get_mut(&key).and_then(VecDeque::pop_front);
        if space.lists.get(&key).is_some_and(VecDeque::is_empty) {
            space.lists.remove(&key);
        }
        Ok(head)
    }

    async fn queue_len(&self, id: &PlayerId) -> Result<u64, DbError> {
        let space = self.inner.lock().await;
        let len = space.lists.get(&keys::queue_key(id)).map_or(0, VecDeque::len);
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }

    async fn get_world_tick(&self) -> Result<u64, DbError> {
        let raw = self.get_raw(keys::TICK_KEY).await;
        parse_tick(keys::TICK_KEY, raw)
    }

    async fn set_world_tick(&self, tick: u64) -> Result<(), DbError> {
        self.inner
            .lock()
            .await
            .strings
            .insert(keys::TICK_KEY.to_owned(), tick.to_string());
        Ok(())
    }
}
