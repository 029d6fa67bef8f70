//! Bounds-checked addressing on top of the unchecked mappers.

use crate::error::{LayoutError, Result};
use crate::offset::{TileOffset, ViewOffset};

/// Wraps a mapper and validates every index before delegating to it.
///
/// The wrapped mapper keeps its unchecked cost model; only callers that go
/// through `Checked` pay for the comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checked<M>(M);

impl<M: ViewOffset> Checked<M> {
    pub fn new(mapping: M) -> Self {
        Checked(mapping)
    }

    pub fn mapping(&self) -> &M {
        &self.0
    }

    pub fn into_inner(self) -> M {
        self.0
    }

    pub fn offset(&self, i0: usize, i1: usize) -> Result<usize> {
        self.check_index(0, i0)?;
        self.check_index(1, i1)?;
        Ok(self.0.offset(i0, i1))
    }

    fn check_index(&self, axis: usize, index: usize) -> Result<()> {
        let extent = self.0.extent(axis);
        if index < extent {
            Ok(())
        } else {
            Err(LayoutError::IndexOutOfBounds {
                axis,
                index,
                extent,
            })
        }
    }
}

impl<const W: usize, const H: usize> Checked<TileOffset<W, H>> {
    pub fn tile_begin(&self, t0: usize, t1: usize) -> Result<usize> {
        self.check_tile(0, t0)?;
        self.check_tile(1, t1)?;
        Ok(self.0.tile_begin(t0, t1))
    }

    fn check_tile(&self, axis: usize, index: usize) -> Result<()> {
        let tiles = self.0.tile_count(axis);
        if index < tiles {
            Ok(())
        } else {
            Err(LayoutError::TileOutOfBounds { axis, index, tiles })
        }
    }
}

impl<M: ViewOffset> From<M> for Checked<M> {
    fn from(mapping: M) -> Self {
        Checked(mapping)
    }
}
