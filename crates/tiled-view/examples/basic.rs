use tiled_view::{print_2d, DenseTile, TileOffset, ViewOffset};

fn main() {
    // A 4x8 array cut into 2x2 tiles
    let map = TileOffset::<2, 2>::new(4, 8);
    println!("2x2 tiles");
    println!("{}", print_2d(&map));

    // Same array with tall 4x2 tiles
    let map = TileOffset::<4, 2>::new(4, 8);
    println!("4x2 tiles");
    println!("{}", print_2d(&map));

    // Extents that do not fill the last tiles leave padding in the span
    let map = TileOffset::<4, 4>::new(6, 5);
    println!("6x5 with 4x4 tiles (padded)");
    println!("{}", print_2d(&map));
    println!(
        "size = {}, span = {}, contiguous = {}",
        map.size(),
        map.span(),
        map.span_is_contiguous()
    );

    // One tile on its own is a plain column-major block
    println!("one 4x4 tile");
    println!("{}", print_2d(&DenseTile::<4, 4>::new()));

    // Inverse mapping
    let offset = map.offset(5, 2);
    println!("(5, 2) is at linear index {}", offset);
    println!("linear index {} is {:?}", offset, map.coord_of(offset));
}
