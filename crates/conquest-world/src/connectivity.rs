//! Territory connectivity pass.
//!
//! A faction only keeps the cells it can reach from one of its strongholds
//! by walking orthogonally through its own cells. Everything else it owns is
//! returned to neutral with its fortification cleared. The sweep always
//! starts from scratch over the whole grid; no state carries over between
//! ticks, so running it twice in a row is a no-op the second time.
//!
//! A faction with no root cells is left alone entirely.

use std::collections::{BTreeSet, VecDeque};

use conquest_types::{CellPos, FactionName, Grid};
use tracing::debug;

/// Cells of `faction` reachable from its roots, roots included.
///
/// Returns `None` when the faction owns no root cell.
pub fn connected_territory(grid: &Grid, faction: FactionName) -> Option<BTreeSet<CellPos>> {
    let roots: Vec<CellPos> = grid
        .cells()
        .filter(|cell| cell.is_root_for(faction))
        .map(conquest_types::Cell::pos)
        .collect();
    if roots.is_empty() {
        return None;
    }

    let mut visited: BTreeSet<CellPos> = roots.iter().copied().collect();
    let mut queue: VecDeque<CellPos> = roots.into_iter().collect();

    while let Some(current) = queue.pop_front() {
        for neighbor in grid.neighbors(current) {
            let owned = grid
                .get(neighbor)
                .is_some_and(|cell| cell.is_owned_by(faction));
            if owned && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Some(visited)
}

/// Revert every owned cell that is cut off from its faction's roots.
///
/// Returns the reverted positions in row-major order.
pub fn enforce_connectivity(grid: &mut Grid) -> Vec<CellPos> {
    let mut orphans: Vec<CellPos> = Vec::new();

    for faction in FactionName::ALL {
        let Some(connected) = connected_territory(grid, faction) else {
            debug!(%faction, "Faction has no strongholds, connectivity not enforced");
            continue;
        };
        orphans.extend(
            grid.cells()
                .filter(|cell| cell.is_owned_by(faction) && !connected.contains(&cell.pos()))
                .map(conquest_types::Cell::pos),
        );
    }

    for pos in &orphans {
        if let Some(cell) = grid.get_mut(*pos) {
            cell.owner_faction = None;
            cell.fortification_level = 0;
        }
    }
    orphans.sort_by_key(|pos| (pos.y, pos.x));

    if !orphans.is_empty() {
        debug!(reverted = orphans.len(), "Connectivity pass reverted cells");
    }
    orphans
}
