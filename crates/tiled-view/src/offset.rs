//! Offset mappers: element coordinates to linear memory offsets.
//!
//! [`TileOffset`] is the tiled mapping. Tiles are `W x H` blocks stored
//! back to back, column-major across the tile grid; inside a tile elements
//! are column-major too. Because `W` and `H` are powers of two, every
//! division and remainder reduces to a shift or a mask.
//!
//! [`DenseTile`] is the compile-time shaped column-major block that a tile
//! sub-view uses.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::layout::{ArrayLayout, LayoutLeft, LayoutTileLeft};

/// Largest rank accepted by the rank-uniform constructor.
pub const MAX_RANK: usize = 8;

/// The mapping from a rank-2 index to a linear offset.
///
/// Implementors participate in a rank-agnostic view interface, so
/// [`ViewOffset::extent`] and [`ViewOffset::stride`] accept any axis.
pub trait ViewOffset: Copy + Debug {
    /// The layout tag this mapping implements.
    type Layout: ArrayLayout;

    /// Linear offset of `(i0, i1)`. Indices are not checked.
    fn offset(&self, i0: usize, i1: usize) -> usize;

    /// Extent of `axis`; `1` past the mapping's rank.
    fn extent(&self, axis: usize) -> usize;

    /// Number of addressable elements.
    fn size(&self) -> usize {
        self.extent(0) * self.extent(1)
    }

    /// Number of storage slots the mapping can touch, padding included.
    fn span(&self) -> usize;

    /// Whether `span() == size()` with no gaps.
    fn span_is_contiguous(&self) -> bool;

    /// Distance between neighbours along `axis`, or `0` when the mapping is
    /// not uniformly strided.
    fn stride(&self, axis: usize) -> usize;
}

/// The logical shape of a rank-2 array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub n0: usize,
    pub n1: usize,
}

impl Extent {
    pub const fn new(n0: usize, n1: usize) -> Self {
        Extent { n0, n1 }
    }
}

impl Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.n0, self.n1)
    }
}

// TileOffset - tiled rank-2 mapping

/// Offset mapper for `LayoutTileLeft<W, H>`.
///
/// Only the extent and the number of tiles along axis 0 are stored; the
/// tile count is recomputed whenever a mapper is built, including on
/// deserialization.
///
/// A tile dimension that is not a power of two does not compile:
///
/// ```compile_fail
/// use tiled_view::TileOffset;
///
/// let _ = TileOffset::<3, 4>::new(8, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Extent", into = "Extent")]
pub struct TileOffset<const W: usize, const H: usize> {
    extent: Extent,
    tile_n0: usize,
}

impl<const W: usize, const H: usize> TileOffset<W, H> {
    const SHAPE_CHECK: () = assert!(
        W.is_power_of_two() && H.is_power_of_two(),
        "tile dimensions must be powers of two"
    );

    const SHIFT_0: u32 = W.trailing_zeros();
    const SHIFT_1: u32 = H.trailing_zeros();
    const SHIFT_T: u32 = Self::SHIFT_0 + Self::SHIFT_1;
    const MASK_0: usize = W - 1;
    const MASK_1: usize = H - 1;

    /// Elements per tile.
    pub const TILE_SIZE: usize = W * H;

    pub const fn new(n0: usize, n1: usize) -> Self {
        let () = Self::SHAPE_CHECK;
        TileOffset {
            extent: Extent::new(n0, n1),
            tile_n0: Self::tiles_over(n0, Self::SHIFT_0, Self::MASK_0),
        }
    }

    // ceil(n / 2^shift) without overflowing near usize::MAX
    const fn tiles_over(n: usize, shift: u32, mask: usize) -> usize {
        (n >> shift) + ((n & mask) != 0) as usize
    }

    /// Build from the rank-uniform extent list used by mappers of every
    /// rank. Extents past axis 1 must be `0` or `1`; missing extents are `0`.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.len() > MAX_RANK {
            return Err(LayoutError::TooManyExtents {
                max: MAX_RANK,
                got: dims.len(),
            });
        }
        let rank = dims.iter().rposition(|&d| d > 1).map_or(0, |axis| axis + 1);
        if rank > 2 {
            return Err(LayoutError::RankMismatch {
                expected: 2,
                got: rank,
            });
        }
        let n0 = dims.first().copied().unwrap_or(0);
        let n1 = dims.get(1).copied().unwrap_or(0);
        Ok(Self::new(n0, n1))
    }

    pub fn extents(&self) -> Extent {
        self.extent
    }

    /// Tiles needed to cover `axis`, partial tiles included; `1` past rank 2.
    pub fn tile_count(&self, axis: usize) -> usize {
        match axis {
            0 => self.tile_n0,
            1 => Self::tiles_over(self.extent.n1, Self::SHIFT_1, Self::MASK_1),
            _ => 1,
        }
    }

    /// Shape of the tile grid.
    pub fn tile_grid(&self) -> (usize, usize) {
        (self.tile_count(0), self.tile_count(1))
    }

    /// Offset of the first element of tile `(t0, t1)`.
    ///
    /// Equal to `offset(t0 * W, t1 * H)`. Tile coordinates are not checked;
    /// coordinates far outside the grid wrap instead of panicking.
    #[inline]
    pub fn tile_begin(&self, t0: usize, t1: usize) -> usize {
        t0.wrapping_add(self.tile_n0.wrapping_mul(t1)) << Self::SHIFT_T
    }

    /// Tile-grid coordinates in storage order, axis 0 fastest.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize)> {
        let (g0, g1) = self.tile_grid();
        (0..g1).flat_map(move |t1| (0..g0).map(move |t0| (t0, t1)))
    }

    /// Inverse of [`ViewOffset::offset`].
    ///
    /// `None` when `offset` is past the span or lands on padding in a
    /// partial tile.
    pub fn coord_of(&self, offset: usize) -> Option<(usize, usize)> {
        if offset >= self.span() {
            return None;
        }
        let tile = offset >> Self::SHIFT_T;
        let local = offset & (Self::TILE_SIZE - 1);
        let i0 = ((tile % self.tile_n0) << Self::SHIFT_0) | (local & Self::MASK_0);
        let i1 = ((tile / self.tile_n0) << Self::SHIFT_1) | (local >> Self::SHIFT_0);
        (i0 < self.extent.n0 && i1 < self.extent.n1).then_some((i0, i1))
    }
}

impl<const W: usize, const H: usize> ViewOffset for TileOffset<W, H> {
    type Layout = LayoutTileLeft<W, H, true>;

    #[inline]
    fn offset(&self, i0: usize, i1: usize) -> usize {
        let tile = (i0 >> Self::SHIFT_0)
            .wrapping_add(self.tile_n0.wrapping_mul(i1 >> Self::SHIFT_1));
        let local = (i0 & Self::MASK_0) | ((i1 & Self::MASK_1) << Self::SHIFT_0);
        (tile << Self::SHIFT_T) + local
    }

    fn extent(&self, axis: usize) -> usize {
        match axis {
            0 => self.extent.n0,
            1 => self.extent.n1,
            _ => 1,
        }
    }

    fn size(&self) -> usize {
        self.extent.n0 * self.extent.n1
    }

    fn span(&self) -> usize {
        (self.tile_n0 * self.tile_count(1)) << Self::SHIFT_T
    }

    fn span_is_contiguous(&self) -> bool {
        (self.extent.n0 & Self::MASK_0) == 0 && (self.extent.n1 & Self::MASK_1) == 0
    }

    // Strides are meaningless for a tiled mapping.
    fn stride(&self, _axis: usize) -> usize {
        0
    }
}

impl<const W: usize, const H: usize> From<Extent> for TileOffset<W, H> {
    fn from(extent: Extent) -> Self {
        Self::new(extent.n0, extent.n1)
    }
}

impl<const W: usize, const H: usize> From<TileOffset<W, H>> for Extent {
    fn from(map: TileOffset<W, H>) -> Self {
        map.extent
    }
}

impl<const W: usize, const H: usize> Display for TileOffset<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:<{},{}>", self.extent, W, H)
    }
}

// DenseTile - a single W x H block

/// Column-major mapping with compile-time extents `W x H`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DenseTile<const W: usize, const H: usize>;

impl<const W: usize, const H: usize> DenseTile<W, H> {
    pub const fn new() -> Self {
        DenseTile
    }
}

impl<const W: usize, const H: usize> ViewOffset for DenseTile<W, H> {
    type Layout = LayoutLeft;

    #[inline]
    fn offset(&self, i0: usize, i1: usize) -> usize {
        i0 + W * i1
    }

    fn extent(&self, axis: usize) -> usize {
        match axis {
            0 => W,
            1 => H,
            _ => 1,
        }
    }

    fn span(&self) -> usize {
        W * H
    }

    fn span_is_contiguous(&self) -> bool {
        true
    }

    fn stride(&self, axis: usize) -> usize {
        match axis {
            0 => 1,
            1 => W,
            _ => W * H,
        }
    }
}

impl<const W: usize, const H: usize> Display for DenseTile<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{}):(1,{})", W, H, W)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_count_rounds_up() {
        let map = TileOffset::<4, 2>::new(9, 5);
        assert_eq!(map.tile_grid(), (3, 3));
        assert_eq!(map.tile_count(2), 1);
    }

    #[test]
    fn test_huge_extents_do_not_overflow() {
        let map = TileOffset::<4, 4>::new(usize::MAX, 1);
        assert_eq!(map.tile_grid(), (usize::MAX / 4 + 1, 1));
        assert!(!map.span_is_contiguous());

        let map = TileOffset::<2, 8>::new(3, usize::MAX);
        assert_eq!(map.tile_count(1), usize::MAX / 8 + 1);

        // Out-of-grid tile and element coordinates wrap.
        let map = TileOffset::<4, 4>::new(8, 8);
        assert_eq!(map.tile_begin(0, usize::MAX), 2usize.wrapping_mul(usize::MAX) << 4);
        assert_eq!(map.tile_begin(usize::MAX, 1), usize::MAX.wrapping_add(2) << 4);
        let _ = map.offset(usize::MAX, usize::MAX);
    }

    #[test]
    fn test_empty_extent() {
        let map = TileOffset::<4, 4>::new(0, 7);
        assert_eq!(map.size(), 0);
        assert_eq!(map.span(), 0);
        assert_eq!(map.tiles().count(), 0);
        assert_eq!(map.coord_of(0), None);
    }

    #[test]
    fn test_non_square_tile() {
        // 8x2 tiles over a 16x4 array: 2x2 tile grid, 16 elements per tile.
        let map = TileOffset::<8, 2>::new(16, 4);
        assert_eq!(map.offset(7, 0), 7);
        assert_eq!(map.offset(0, 1), 8);
        assert_eq!(map.offset(8, 0), 16);
        assert_eq!(map.offset(0, 2), 32);
        assert_eq!(map.offset(15, 3), 63);
        assert_eq!(map.span(), 64);
    }

    #[test]
    fn test_from_dims() {
        let map = TileOffset::<2, 2>::from_dims(&[4, 6, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(map, TileOffset::new(4, 6));

        let map = TileOffset::<2, 2>::from_dims(&[4, 6, 1, 1]).unwrap();
        assert_eq!(map.extents(), Extent::new(4, 6));

        let map = TileOffset::<2, 2>::from_dims(&[3]).unwrap();
        assert_eq!(map.extents(), Extent::new(3, 0));

        assert_eq!(
            TileOffset::<2, 2>::from_dims(&[4, 6, 0, 3]),
            Err(LayoutError::RankMismatch {
                expected: 2,
                got: 4
            })
        );
        let err = TileOffset::<2, 2>::from_dims(&[1; 9]).unwrap_err();
        assert_eq!(err, LayoutError::TooManyExtents { max: MAX_RANK, got: 9 });
        assert_eq!(err.to_string(), "too many extents: at most 8, got 9");
    }

    #[test]
    fn test_dense_tile() {
        let map = DenseTile::<4, 2>::new();
        assert_eq!(map.offset(3, 0), 3);
        assert_eq!(map.offset(0, 1), 4);
        assert_eq!(map.size(), 8);
        assert_eq!(map.span(), 8);
        assert!(map.span_is_contiguous());
        assert_eq!((map.stride(0), map.stride(1)), (1, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(TileOffset::<2, 4>::new(6, 8).to_string(), "(6,8):<2,4>");
        assert_eq!(DenseTile::<2, 4>::new().to_string(), "(2,4):(1,2)");
    }
}
