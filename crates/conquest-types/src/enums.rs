//! Enumeration types for the Conquest simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Factions
// ---------------------------------------------------------------------------

/// One of the fixed factions competing for the grid.
///
/// The set is closed for the lifetime of a match. Modelling it as an enum
/// makes "an owned cell's owner is always a known faction" a type-level
/// guarantee rather than something the store has to be trusted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FactionName {
    /// The red faction (top-left start).
    Red,
    /// The blue faction (top-right start).
    Blue,
    /// The green faction (bottom-left start).
    Green,
}

impl FactionName {
    /// Every faction, in a stable order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Blue, Self::Green];

    /// Lowercase name as used in store keys and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }
}

impl core::fmt::Display for FactionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for FactionName {
    type Err = UnknownFaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFaction(s.to_owned()))
    }
}

/// Returned when parsing a faction name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown faction: {0}")]
pub struct UnknownFaction(pub String);

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// A structure standing on a cell.
///
/// Any structure on an owned cell anchors its owner's territory for the
/// connectivity pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StructureKind {
    /// A faction's home base, placed at match setup.
    Stronghold,
    /// A fortified keep.
    Castle,
    /// A production site.
    Factory,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The kind of action a player can queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionType {
    /// Wear down or capture an adjacent cell.
    Attack,
    /// Raise the fortification of an owned cell.
    Fortify,
    /// Move AP from the player into the faction pool.
    DonateAp,
    /// Spend faction pool AP on an upgrade.
    UpgradeRequest,
}

/// Why the applier turned an action down.
///
/// Rejection is an expected, frequent outcome. It never aborts a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// Target coordinates are outside the grid.
    OutOfBounds,
    /// Attack target already belongs to the attacker's faction.
    AlreadyOwned,
    /// Attack target does not border the attacker's territory.
    NotAdjacent,
    /// Fortify target is not owned by the player's faction.
    NotOwned,
    /// The player does not hold enough AP.
    InsufficientAp,
    /// The faction pool does not hold enough AP.
    InsufficientPool,
    /// A donation amount was zero or negative.
    NonPositiveAmount,
    /// The player's faction record is missing from the store.
    FactionNotFound,
    /// Applying the action would overflow a counter.
    Overflow,
}
