use super::missing_glyph;

#[test]
fn box_fits_tile_and_sits_on_baseline() {
    let bmp = missing_glyph(16, 16, 12.0);
    assert_eq!(bmp.width, 9);
    assert_eq!(bmp.height, 12);
    assert_eq!(bmp.top, 12);
    assert!(bmp.is_consistent());
    assert!(bmp.left as u32 + bmp.width <= 16);
}

#[test]
fn border_is_solid_and_interior_empty() {
    let bmp = missing_glyph(16, 16, 12.0);
    let at = |x: u32, y: u32| bmp.data[(y * bmp.width + x) as usize];
    assert_eq!(at(0, 0), 0xFF);
    assert_eq!(at(bmp.width - 1, bmp.height - 1), 0xFF);
    assert_eq!(at(0, 5), 0xFF);
    assert_eq!(at(4, 5), 0);
}

#[test]
fn deterministic() {
    assert_eq!(missing_glyph(20, 24, 18.4), missing_glyph(20, 24, 18.4));
}

#[test]
fn tall_ascender_is_clamped_to_tile() {
    let bmp = missing_glyph(4, 6, 40.0);
    assert_eq!(bmp.height, 6);
    assert!(bmp.width <= 4);
}

#[test]
fn degenerate_inputs_still_produce_a_pixel() {
    let bmp = missing_glyph(1, 1, -3.0);
    assert_eq!((bmp.width, bmp.height), (1, 1));
    assert_eq!(bmp.data, vec![0xFF]);
    assert_eq!(bmp.left, 0);
}
