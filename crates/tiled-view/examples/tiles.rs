use tiled_view::{tile_subview, try_tile_subview, TileOffset, TiledView, View};
use tracing_subscriber::EnvFilter;

// Run with RUST_LOG=tiled_view=trace to see allocation and binding events.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let view: TiledView<f32, 4, 4> = View::from_elem(TileOffset::new(8, 8), 0.0);
    for i1 in 0..8 {
        for i0 in 0..8 {
            unsafe { view.write(i0, i1, (i0 * 8 + i1) as f32) };
        }
    }

    for (t0, t1) in view.mapping().tiles() {
        let tile = tile_subview(&view, t0, t1);
        let corner = unsafe { tile.read(0, 0) };
        println!(
            "tile ({}, {}): first element {}, holders {}",
            t0,
            t1,
            corner,
            tile.use_count()
        );
    }

    match try_tile_subview(&view, 2, 0) {
        Ok(_) => println!("unexpected tile"),
        Err(err) => println!("rejected: {}", err),
    }
}
