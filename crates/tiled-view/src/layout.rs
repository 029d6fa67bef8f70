//! Layout tags and the compile-time tiled-layout classifier.

use std::fmt::Debug;

use crate::offset::TileOffset;

/// A layout tag. Carries no data; it only selects an addressing scheme.
///
/// Every layout answers `false` to [`ArrayLayout::IS_TILED`] unless it
/// overrides it.
pub trait ArrayLayout: Copy + Default + Debug {
    const IS_TILED: bool = false;
}

/// A layout whose elements are grouped into `TILE_0 x TILE_1` blocks.
pub trait TiledLayout: ArrayLayout {
    const TILE_0: usize;
    const TILE_1: usize;

    /// The offset mapper used for views with this layout.
    type Offset;
}

/// Column-major: the left-most index varies fastest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutLeft;

/// Row-major: the right-most index varies fastest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutRight;

/// Column-major tiles of `N0 x N1` elements, tiles themselves laid out
/// column-major across the tile grid.
///
/// `IS_TILED` separates the tiled family from other layouts that carry the
/// same two extents. Only `LayoutTileLeft<N0, N1, true>` is classified as
/// tiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutTileLeft<const N0: usize, const N1: usize, const IS_TILED: bool = true>;

impl ArrayLayout for LayoutLeft {}

impl ArrayLayout for LayoutRight {}

impl<const N0: usize, const N1: usize> ArrayLayout for LayoutTileLeft<N0, N1, false> {}

impl<const N0: usize, const N1: usize> ArrayLayout for LayoutTileLeft<N0, N1, true> {
    const IS_TILED: bool = true;
}

impl<const N0: usize, const N1: usize> TiledLayout for LayoutTileLeft<N0, N1, true> {
    const TILE_0: usize = N0;
    const TILE_1: usize = N1;

    type Offset = TileOffset<N0, N1>;
}

/// Whether `L` denotes a tiled layout. Usable in const contexts.
///
/// ```
/// use tiled_view::{is_tiled_layout, LayoutLeft, LayoutTileLeft};
///
/// const TILED: bool = is_tiled_layout::<LayoutTileLeft<4, 4>>();
/// assert!(TILED);
/// assert!(!is_tiled_layout::<LayoutLeft>());
/// assert!(!is_tiled_layout::<LayoutTileLeft<4, 4, false>>());
/// ```
pub const fn is_tiled_layout<L: ArrayLayout>() -> bool {
    L::IS_TILED
}
