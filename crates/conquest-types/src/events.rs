//! Egress events published when a tick changes the grid.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grid::{Cell, CellPos, Grid};

/// Broadcast to observers at most once per tick, and only when at least one
/// cell changed.
///
/// Carries both the full grid (for clients that just connected) and the
/// changed cells (for clients that patch in place).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridUpdate {
    /// The tick that produced the change.
    pub tick: u64,
    /// Full grid after the tick.
    #[ts(type = "Array<Array<Cell>>")]
    pub grid: Grid,
    /// Cells that differ from the start of the tick.
    pub changed: Vec<Cell>,
    /// Cells the connectivity pass returned to neutral this tick.
    pub reverted: Vec<CellPos>,
}
