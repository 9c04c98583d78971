//! Match setup: the opening grid and faction records.
//!
//! ```text
//! +-------+-----------+-------+
//! | red   |           | blue  |
//! +-------+           +-------+
//! |          neutral          |
//! +-------+           +-------+
//! | green |           |       |
//! +-------+-----------+-------+
//! ```
//!
//! Each faction owns a `region_size` square in its corner with a stronghold
//! on the outermost cell. The bottom-right corner stays neutral.

use conquest_types::{CellPos, Faction, FactionName, Grid, StructureKind};
use tracing::info;

use crate::error::WorldError;

/// Build the opening grid.
///
/// # Errors
///
/// Returns [`WorldError::EmptyRegion`] if `region_size` is zero,
/// [`WorldError::GridTooSmall`] if two regions would not fit side by side
/// along either axis, and [`WorldError::Grid`] if a dimension is zero.
pub fn create_starting_grid(
    width: u32,
    height: u32,
    region_size: u32,
) -> Result<Grid, WorldError> {
    if region_size == 0 {
        return Err(WorldError::EmptyRegion);
    }
    let too_small = WorldError::GridTooSmall {
        width,
        height,
        region_size,
    };
    let span = region_size.checked_mul(2).ok_or_else(|| too_small.clone())?;
    if span > width || span > height {
        return Err(too_small);
    }

    let mut grid = Grid::new(width, height)?;
    let far_x = width.checked_sub(region_size).ok_or_else(|| too_small.clone())?;
    let far_y = height.checked_sub(region_size).ok_or(too_small)?;

    let corners = [
        (FactionName::Red, 0, 0),
        (FactionName::Blue, far_x, 0),
        (FactionName::Green, 0, far_y),
    ];

    for (faction, origin_x, origin_y) in corners {
        claim_region(&mut grid, faction, origin_x, origin_y, region_size);
        let anchor = stronghold_position(width, height, faction);
        if let Some(cell) = anchor.and_then(|pos| grid.get_mut(pos)) {
            cell.structure = Some(StructureKind::Stronghold);
        }
    }

    info!(width, height, region_size, "Created starting grid");
    Ok(grid)
}

/// One empty faction record per faction.
pub fn starting_factions() -> Vec<Faction> {
    FactionName::ALL.into_iter().map(Faction::new).collect()
}

fn claim_region(grid: &mut Grid, faction: FactionName, origin_x: u32, origin_y: u32, size: u32) {
    for cell in grid.cells_mut() {
        let in_x = cell.x >= origin_x && cell.x.saturating_sub(origin_x) < size;
        let in_y = cell.y >= origin_y && cell.y.saturating_sub(origin_y) < size;
        if in_x && in_y {
            cell.owner_faction = Some(faction);
        }
    }
}

/// The corner cell a faction's stronghold stands on.
fn stronghold_position(width: u32, height: u32, faction: FactionName) -> Option<CellPos> {
    match faction {
        FactionName::Red => Some(CellPos { x: 0, y: 0 }),
        FactionName::Blue => Some(CellPos {
            x: width.checked_sub(1)?,
            y: 0,
        }),
        FactionName::Green => Some(CellPos {
            x: 0,
            y: height.checked_sub(1)?,
        }),
    }
}
