//! Player and faction records.
//!
//! Both are persisted as JSON under `player:{id}` and `faction:{name}`.
//! Field names follow the camelCase the web client already speaks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::FactionName;
use crate::ids::PlayerId;

/// A participant in the match.
///
/// The action queue is not part of this record; it lives in its own list
/// key so ingress can append without a read-modify-write of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Identifier assigned by the identity layer.
    pub id: PlayerId,
    /// Faction membership. Never changes once assigned.
    pub faction: FactionName,
    /// Spendable action points.
    pub ap: u64,
}

impl Player {
    /// Create a player with the given starting AP.
    pub const fn new(id: PlayerId, faction: FactionName, ap: u64) -> Self {
        Self { id, faction, ap }
    }
}

/// Shared state of one faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Faction {
    /// Which faction this is.
    pub name: FactionName,
    /// AP pooled from member donations.
    #[serde(default)]
    pub ap_pool: u64,
    /// Acquired upgrades: label -> count.
    #[serde(default)]
    pub upgrades: BTreeMap<String, u64>,
}

impl Faction {
    /// An empty faction: no pooled AP, no upgrades.
    pub const fn new(name: FactionName) -> Self {
        Self {
            name,
            ap_pool: 0,
            upgrades: BTreeMap::new(),
        }
    }

    /// How many of `upgrade` the faction has acquired.
    pub fn upgrade_count(&self, upgrade: &str) -> u64 {
        self.upgrades.get(upgrade).copied().unwrap_or(0)
    }
}
