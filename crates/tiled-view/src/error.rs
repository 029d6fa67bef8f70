//! Error types for the checked layer.

use thiserror::Error;

/// Errors raised by checked addressing and rank-uniform construction.
///
/// The unchecked mappers never produce these; they only show up when a
/// caller opts into validation through [`crate::Checked`],
/// [`crate::try_tile_subview`] or [`crate::TileOffset::from_dims`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An element index lies outside the extent of its axis.
    #[error("index {index} out of bounds for axis {axis} with extent {extent}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },

    /// A tile-grid coordinate lies outside the tile grid.
    #[error("tile {index} out of bounds for axis {axis} with {tiles} tiles")]
    TileOutOfBounds {
        axis: usize,
        index: usize,
        tiles: usize,
    },

    /// Extents were supplied for axes the mapping does not have.
    #[error("rank mismatch: expected {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// More extents than any mapping accepts.
    #[error("too many extents: at most {max}, got {got}")]
    TooManyExtents { max: usize, got: usize },
}

/// Result type for checked layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
