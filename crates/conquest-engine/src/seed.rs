//! First-run world seeding.
//!
//! A fresh store gets the starting grid and an empty record for every
//! faction. A store that already holds a grid is resumed as-is, so
//! restarting the engine never wipes a match in progress.

use conquest_core::config::WorldConfig;
use conquest_db::StateStore;
use conquest_world::{create_starting_grid, starting_factions};
use tracing::info;

use crate::error::EngineError;

/// What seeding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// A new grid was written.
    pub grid_created: bool,
    /// Faction records that were missing and got created.
    pub factions_created: u32,
}

/// Seed `store` from `world` where state is missing.
pub async fn seed_world<S: StateStore>(
    store: &S,
    world: &WorldConfig,
) -> Result<SeedReport, EngineError> {
    let grid_created = if store.get_grid().await?.is_some() {
        let tick = store.get_world_tick().await?;
        info!(tick, "Existing grid found, resuming");
        false
    } else {
        let grid = create_starting_grid(world.grid_width, world.grid_height, world.region_size)?;
        store.set_grid(&grid).await?;
        true
    };

    let mut factions_created: u32 = 0;
    for faction in starting_factions() {
        if store.get_faction(faction.name).await?.is_none() {
            store.set_faction(&faction).await?;
            factions_created = factions_created.saturating_add(1);
        }
    }

    info!(grid_created, factions_created, "World seeded");
    Ok(SeedReport {
        grid_created,
        factions_created,
    })
}
