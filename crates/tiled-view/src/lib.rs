//! Tiled memory layout for rank-2 array views.
//!
//! The array is cut into `W x H` tiles, both powers of two, and each
//! `(i0, i1)` is mapped to its linear offset with shifts and masks only.
//! Tiles are stored column-major across the tile grid and each tile is a
//! dense column-major block, so a single tile can be handed out as an
//! ordinary contiguous view.
//!
//! ```
//! use tiled_view::{tile_subview, TileOffset, TiledView, View, ViewOffset};
//!
//! let map = TileOffset::<2, 2>::new(4, 4);
//! assert_eq!(map.offset(0, 2), 8);
//! assert_eq!(map.tile_begin(1, 1), map.offset(2, 2));
//!
//! let view: TiledView<f32, 2, 2> = View::from_elem(map, 0.0);
//! let tile = tile_subview(&view, 1, 1);
//! assert_eq!(view.use_count(), 2);
//! assert!(tile.is_managed());
//! ```

mod checked;
mod error;
mod layout;
mod offset;
mod view;

pub use checked::Checked;
pub use error::{LayoutError, Result};
pub use layout::{is_tiled_layout, ArrayLayout, LayoutLeft, LayoutRight, LayoutTileLeft, TiledLayout};
pub use offset::{DenseTile, Extent, TileOffset, ViewOffset, MAX_RANK};
pub use view::{
    assign_tile, tile_subview, try_tile_subview, Allocation, TileView, TiledView, Tracker, View,
};

// Visualization

/// Create an ASCII table of the offsets of a rank-2 mapping.
///
/// Rows are axis 0 and columns axis 1, both capped at 16.
pub fn print_2d<M: ViewOffset + std::fmt::Display>(mapping: &M) -> String {
    let mut lines = vec![mapping.to_string()];

    let max_m = mapping.extent(0).min(16);
    let max_n = mapping.extent(1).min(16);

    let max_idx = mapping.span();
    let idx_width = format!("{}", max_idx).len().max(1);

    // Column headers: "      0   1   2   3"
    let mut header = "   ".to_string();
    for n in 0..max_n {
        header.push_str(&format!("{:>width$}", n, width = idx_width + 3));
    }
    lines.push(header);

    // Separator: "    +---+---+---+---+"
    let sep = "    +".to_string()
        + &(0..max_n)
            .map(|_| format!("{}+", "-".repeat(idx_width + 2)))
            .collect::<String>();
    lines.push(sep.clone());

    for m in 0..max_m {
        let mut row = format!("{:>2}  |", m);
        for n in 0..max_n {
            let idx = mapping.offset(m, n);
            row.push_str(&format!("{:>width$} |", idx, width = idx_width + 1));
        }
        lines.push(row);
        lines.push(sep.clone());
    }

    lines.join("\n")
}
