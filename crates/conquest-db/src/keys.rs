//! Store key layout.
//!
//! | Pattern                | Type    | Description                        |
//! |------------------------|---------|------------------------------------|
//! | `player:{id}`          | JSON    | [`Player`](conquest_types::Player) |
//! | `player:{id}:actions`  | List    | Queued actions, oldest at the head |
//! | `faction:{name}`       | JSON    | [`Faction`](conquest_types::Faction) |
//! | `grid`                 | JSON    | 2-D array of cells, `grid[y][x]`   |
//! | `world:players`        | Set     | Registered player ids              |
//! | `world:tick`           | Integer | Last completed tick                |
//!
//! Player ids are embedded verbatim, so an id containing
//! [`KEY_SEPARATOR`] could name another player's queue. Ingress refuses such
//! ids before anything is written.

use conquest_types::{FactionName, PlayerId};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = ':';

/// The shared grid.
pub const GRID_KEY: &str = "grid";

/// Set of every registered player id.
pub const PLAYERS_KEY: &str = "world:players";

/// Last completed tick number.
pub const TICK_KEY: &str = "world:tick";

/// `player:{id}`
pub fn player_key(id: &PlayerId) -> String {
    format!("player:{id}")
}

/// `player:{id}:actions`
pub fn queue_key(id: &PlayerId) -> String {
    format!("player:{id}:actions")
}

/// `faction:{name}`
pub fn faction_key(name: FactionName) -> String {
    format!("faction:{name}")
}
