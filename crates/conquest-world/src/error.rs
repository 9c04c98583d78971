//! Error types for the `conquest-world` crate.

use conquest_types::GridError;

/// Errors that can occur while building or reshaping the grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The underlying grid rejected an operation.
    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    /// The grid is too small to hold every faction's starting region
    /// without overlap.
    #[error("grid {width}x{height} cannot fit starting regions of size {region_size}")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Requested side length of each corner region.
        region_size: u32,
    },

    /// A starting region must be at least one cell wide.
    #[error("starting region size must be at least 1")]
    EmptyRegion,
}
