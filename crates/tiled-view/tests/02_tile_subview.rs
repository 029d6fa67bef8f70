use tiled_view::{
    assign_tile, tile_subview, try_tile_subview, DenseTile, LayoutError, TileOffset, TileView,
    TiledView, Tracker, View, ViewOffset,
};

// Fill a tiled view so that element (i0, i1) holds 100 * i0 + i1.
fn numbered<const W: usize, const H: usize>(n0: usize, n1: usize) -> TiledView<usize, W, H> {
    let view = View::from_elem(TileOffset::new(n0, n1), usize::MAX);
    for i1 in 0..n1 {
        for i0 in 0..n0 {
            unsafe { view.write(i0, i1, 100 * i0 + i1) };
        }
    }
    view
}

#[test]
fn test_every_tile_matches_source() {
    let src = numbered::<4, 2>(8, 6);
    for (t0, t1) in src.mapping().tiles() {
        let tile = tile_subview(&src, t0, t1);
        assert_eq!(tile.extent(0), 4);
        assert_eq!(tile.extent(1), 2);
        assert!(tile.mapping().span_is_contiguous());
        for j1 in 0..2 {
            for j0 in 0..4 {
                let expected = 100 * (4 * t0 + j0) + (2 * t1 + j1);
                assert_eq!(unsafe { tile.read(j0, j1) }, expected);
            }
        }
    }
    assert_eq!(src.use_count(), 1);
}

#[test]
fn test_tile_is_contiguous_block_of_source() {
    let src = numbered::<2, 2>(4, 4);
    let tile = tile_subview(&src, 0, 1);
    let base = src.mapping().tile_begin(0, 1);
    assert_eq!(tile.as_ptr(), src.as_ptr().wrapping_add(base));
    for k in 0..4 {
        assert_eq!(
            tile.as_ptr().wrapping_add(k),
            tile.ptr_at(k % 2, k / 2),
            "tile element {} out of place",
            k
        );
    }
}

#[test]
fn test_boundary_tile_exposes_padding() {
    // 3x3 with 2x2 tiles: tile (1, 1) holds one real element.
    let src = numbered::<2, 2>(3, 3);
    let tile = try_tile_subview(&src, 1, 1).unwrap();
    assert_eq!(unsafe { tile.read(0, 0) }, 202);
    assert_eq!(unsafe { tile.read(1, 1) }, usize::MAX);
}

#[test]
fn test_ownership_propagation_owned() {
    let src = numbered::<2, 2>(4, 4);
    let tiles: Vec<TileView<usize, 2, 2>> = src
        .mapping()
        .tiles()
        .map(|(t0, t1)| tile_subview(&src, t0, t1))
        .collect();
    assert_eq!(src.use_count(), 5);
    assert!(tiles.iter().all(|t| t.is_managed()));

    // Siblings and the tiles keep the memory alive after the source is gone.
    drop(src);
    assert_eq!(tiles[0].use_count(), 4);
    assert_eq!(unsafe { tiles[3].read(1, 1) }, 303);
}

#[test]
fn test_ownership_propagation_unmanaged() {
    let mut buf: Vec<u32> = (0..16).collect();
    let src: TiledView<u32, 2, 2> =
        unsafe { View::from_raw_parts(buf.as_mut_ptr(), TileOffset::new(4, 4)) };
    let tile = tile_subview(&src, 1, 1);
    assert!(matches!(tile.tracker(), Tracker::Unmanaged));
    assert_eq!(unsafe { tile.read(0, 1) }, 14);

    drop(src);
    drop(tile);
    // The buffer is still ours to use and free.
    assert_eq!(buf.len(), 16);
}

#[test]
fn test_assign_tile_takes_source_state() {
    let mut buf = vec![0i64; 16];
    let unmanaged: TiledView<i64, 2, 2> =
        unsafe { View::from_raw_parts(buf.as_mut_ptr(), TileOffset::new(4, 4)) };
    let managed: TiledView<i64, 2, 2> = View::from_elem(TileOffset::new(4, 4), 3);

    let mut dst: TileView<i64, 2, 2> = View::from_elem(DenseTile::new(), 0);
    assign_tile(&mut dst, &managed, 1, 0);
    assert!(dst.is_managed());
    assert_eq!(managed.use_count(), 2);

    assign_tile(&mut dst, &unmanaged, 1, 0);
    assert!(!dst.is_managed());
    assert_eq!(managed.use_count(), 1);
    assert_eq!(dst.as_ptr(), buf.as_mut_ptr().wrapping_add(4));
}

#[test]
fn test_subview_is_independent_of_source_shape() {
    let mut src = numbered::<2, 2>(4, 4);
    let tile = tile_subview(&src, 1, 0);
    // Rebinding the source to a new shape leaves the tile untouched.
    src = numbered::<2, 2>(8, 8);
    assert_eq!(tile.extent(0), 2);
    assert_eq!(unsafe { tile.read(1, 1) }, 301);
    assert_eq!(src.use_count(), 1);
}

#[test]
fn test_try_tile_subview_errors() {
    let src = numbered::<4, 4>(8, 5);
    assert_eq!(src.mapping().tile_grid(), (2, 2));
    assert_eq!(
        try_tile_subview(&src, 2, 0).unwrap_err(),
        LayoutError::TileOutOfBounds {
            axis: 0,
            index: 2,
            tiles: 2
        }
    );
    assert!(try_tile_subview(&src, 1, 1).is_ok());
}
