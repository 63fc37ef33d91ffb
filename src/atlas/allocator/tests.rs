use crate::atlas::rect::PixelRect;
use crate::error::ConfigError;

use super::{Overflow, PackCursor, TileAllocator};

#[test]
fn first_tile_at_origin() {
    let alloc = TileAllocator::new(16, 16, 256, 256).unwrap();
    let mut cursor = PackCursor::default();
    assert_eq!(
        alloc.reserve_tile(&mut cursor),
        Ok(PixelRect::new(0, 0, 16, 16))
    );
    assert_eq!(cursor.position(), (16, 0));
}

#[test]
fn wraps_to_next_row() {
    let alloc = TileAllocator::new(16, 16, 48, 48).unwrap();
    let mut cursor = PackCursor::default();
    for _ in 0..3 {
        alloc.reserve_tile(&mut cursor).unwrap();
    }
    let fourth = alloc.reserve_tile(&mut cursor).unwrap();
    assert_eq!(fourth, PixelRect::new(0, 16, 16, 16));
    assert_eq!(alloc.slot_of(fourth), 3);
}

#[test]
fn page_full_reports_overflow() {
    let alloc = TileAllocator::new(16, 16, 32, 32).unwrap();
    let mut cursor = PackCursor::default();
    let mut count = 0;
    while alloc.reserve_tile(&mut cursor).is_ok() {
        count += 1;
        // Safety valve: 32x32 holds at most 4 of 16x16.
        assert!(count <= 4, "packed too many");
    }
    assert_eq!(count, 4);
    assert_eq!(alloc.slots_per_page(), 4);
}

#[test]
fn overflow_leaves_cursor_untouched() {
    let alloc = TileAllocator::new(16, 16, 32, 32).unwrap();
    let mut cursor = PackCursor::default();
    while alloc.reserve_tile(&mut cursor).is_ok() {}
    let before = cursor;
    assert_eq!(alloc.reserve_tile(&mut cursor), Err(Overflow));
    assert_eq!(cursor, before);
}

#[test]
fn full_grid_has_no_overlaps() {
    let alloc = TileAllocator::new(16, 20, 256, 256).unwrap();
    let mut cursor = PackCursor::default();
    let mut packed = Vec::new();
    while let Ok(r) = alloc.reserve_tile(&mut cursor) {
        assert!(r.fits_within(256, 256), "tile {r:?} outside page");
        packed.push(r);
    }
    assert_eq!(packed.len() as u32, alloc.slots_per_page());
    for (i, a) in packed.iter().enumerate() {
        for b in &packed[i + 1..] {
            let overlap_x = a.x < b.right() && b.x < a.right();
            let overlap_y = a.y < b.bottom() && b.y < a.bottom();
            assert!(!(overlap_x && overlap_y), "overlap: {a:?} vs {b:?}");
        }
    }
}

#[test]
fn mixed_heights_use_tallest_in_row() {
    let alloc = TileAllocator::new(8, 8, 32, 64).unwrap();
    let mut cursor = PackCursor::default();
    alloc.reserve(&mut cursor, 16, 10).unwrap();
    alloc.reserve(&mut cursor, 16, 24).unwrap();
    let next = alloc.reserve(&mut cursor, 8, 8).unwrap();
    assert_eq!(next, PixelRect::new(0, 24, 8, 8));
}

#[test]
fn oversized_request_overflows() {
    let alloc = TileAllocator::new(8, 8, 32, 32).unwrap();
    let mut cursor = PackCursor::default();
    assert_eq!(alloc.reserve(&mut cursor, 33, 8), Err(Overflow));
}

#[test]
fn rejects_bad_geometry() {
    assert_eq!(
        TileAllocator::new(0, 16, 256, 256).unwrap_err(),
        ConfigError::InvalidTileSize {
            width: 0,
            height: 16
        }
    );
    assert!(matches!(
        TileAllocator::new(32, 32, 16, 256),
        Err(ConfigError::PageTooSmall { .. })
    ));
}
