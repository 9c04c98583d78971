//! The shared grid and its cells.
//!
//! The grid is a fixed-size rectangular matrix stored row-major
//! (`rows[y][x]`). It serializes as a bare 2-D array of cells so the stored
//! `grid` record and the broadcast snapshot have the same shape the client
//! renders. Deserialization goes through [`Grid::from_rows`], so a ragged or
//! mislabelled matrix never makes it into memory.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FactionName, StructureKind};
use crate::ids::PlayerId;

/// Errors raised when building or mutating a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The grid would have no cells.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// A row's length differs from the first row's.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// A cell's own coordinates disagree with its position in the matrix.
    #[error("cell at ({x}, {y}) is labelled ({label_x}, {label_y})")]
    Mislabelled {
        /// Column in the matrix.
        x: usize,
        /// Row in the matrix.
        y: usize,
        /// The cell's `x` field.
        label_x: u32,
        /// The cell's `y` field.
        label_y: u32,
    },

    /// A dimension does not fit in `u32`.
    #[error("grid dimension too large")]
    TooLarge,

    /// A coordinate lies outside the grid.
    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
}

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellPos {
    /// Column, `0..width`.
    pub x: u32,
    /// Row, `0..height`.
    pub y: u32,
}

/// One square of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Owning faction; `None` is neutral.
    #[serde(default)]
    pub owner_faction: Option<FactionName>,
    /// Defense buffer consumed by attacks before ownership changes.
    #[serde(default)]
    pub fortification_level: u32,
    /// Last player whose attack wore down this cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attacked_by: Option<PlayerId>,
    /// Last player who fortified this cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fortified_by: Option<PlayerId>,
    /// Last player who captured this cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_captured_by: Option<PlayerId>,
    /// Structure standing on the cell, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureKind>,
}

impl Cell {
    /// A neutral, unfortified, empty cell at `(x, y)`.
    pub const fn neutral(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            owner_faction: None,
            fortification_level: 0,
            last_attacked_by: None,
            last_fortified_by: None,
            last_captured_by: None,
            structure: None,
        }
    }

    /// The cell's coordinate.
    pub const fn pos(&self) -> CellPos {
        CellPos {
            x: self.x,
            y: self.y,
        }
    }

    /// Whether `faction` owns this cell.
    pub fn is_owned_by(&self, faction: FactionName) -> bool {
        self.owner_faction == Some(faction)
    }

    /// Whether this cell anchors `faction`'s territory.
    pub fn is_root_for(&self, faction: FactionName) -> bool {
        self.is_owned_by(faction) && self.structure.is_some()
    }
}

/// A rectangular matrix of [`Cell`]s, fixed in size for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: u32,
    height: u32,
}

impl Grid {
    /// Create an all-neutral grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        let rows = (0..height)
            .map(|y| (0..width).map(|x| Cell::neutral(x, y)).collect())
            .collect();
        Ok(Self {
            rows,
            width,
            height,
        })
    }

    /// Build a grid from a row-major matrix, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the matrix is empty, ragged, or a cell's
    /// coordinates disagree with its position.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }
        for (y, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(GridError::Ragged {
                    row: y,
                    expected,
                    found: row.len(),
                });
            }
            for (x, cell) in row.iter().enumerate() {
                let matches = usize::try_from(cell.x).is_ok_and(|cx| cx == x)
                    && usize::try_from(cell.y).is_ok_and(|cy| cy == y);
                if !matches {
                    return Err(GridError::Mislabelled {
                        x,
                        y,
                        label_x: cell.x,
                        label_y: cell.y,
                    });
                }
            }
        }
        let width = u32::try_from(expected).map_err(|_e| GridError::TooLarge)?;
        let height = u32::try_from(rows.len()).map_err(|_e| GridError::TooLarge)?;
        Ok(Self {
            rows,
            width,
            height,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The row-major cell matrix.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Look up a cell.
    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        self.rows.get(y)?.get(x)
    }

    /// Look up a cell mutably.
    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        self.rows.get_mut(y)?.get_mut(x)
    }

    /// Resolve signed coordinates (as submitted by players) to a position.
    ///
    /// Returns `None` for anything outside the grid, negatives included.
    pub fn locate(&self, x: i64, y: i64) -> Option<CellPos> {
        let pos = CellPos {
            x: u32::try_from(x).ok()?,
            y: u32::try_from(y).ok()?,
        };
        self.contains(pos).then_some(pos)
    }

    /// Whether `pos` lies inside the grid.
    pub const fn contains(&self, pos: CellPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The up-to-four orthogonal neighbours of `pos` that lie inside the grid.
    pub fn neighbors(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        let candidates = [
            pos.y.checked_sub(1).map(|y| CellPos { x: pos.x, y }),
            pos.y.checked_add(1).map(|y| CellPos { x: pos.x, y }),
            pos.x.checked_sub(1).map(|x| CellPos { x, y: pos.y }),
            pos.x.checked_add(1).map(|x| CellPos { x, y: pos.y }),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |p| self.contains(*p))
    }

    /// Iterate every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Iterate every cell mutably, row by row.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().flatten()
    }

    /// Overwrite the cell at the replacement's own coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinates fall outside
    /// the grid.
    pub fn replace_cell(&mut self, cell: Cell) -> Result<(), GridError> {
        let pos = cell.pos();
        let slot = self
            .get_mut(pos)
            .ok_or(GridError::OutOfBounds { x: pos.x, y: pos.y })?;
        *slot = cell;
        Ok(())
    }

    /// Cells whose value differs from the same position in `before`.
    ///
    /// Grids of different dimensions are treated as entirely changed.
    pub fn changed_since(&self, before: &Self) -> Vec<Cell> {
        if self.width != before.width || self.height != before.height {
            return self.cells().cloned().collect();
        }
        self.cells()
            .zip(before.cells())
            .filter(|(now, then)| now != then)
            .map(|(now, _)| now.clone())
            .collect()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}
