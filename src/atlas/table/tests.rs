use crate::atlas::{PageId, PixelRect, Tile};

use super::{CachedGlyph, GlyphTable};

fn tile(x: u32) -> Tile {
    Tile::new(PixelRect::new(x, 0, 16, 16), PageId(0), 256, 256)
}

#[test]
fn empty_table() {
    let table = GlyphTable::new();
    assert!(table.is_empty());
    assert_eq!(table.get('a'), None);
    assert_eq!(table.tile(0), None);
}

#[test]
fn insert_then_get() {
    let mut table = GlyphTable::new();
    let t = table.push_tile(tile(16));
    let glyph = CachedGlyph {
        tile: t,
        left: 1,
        top: 12,
    };
    table.insert('a', glyph);

    assert!(table.contains('a'));
    assert_eq!(table.get('a'), Some(&glyph));
    assert_eq!(table.tile(t), Some(&tile(16)));
    assert_eq!(table.lookup('a'), Some((glyph, tile(16))));
    assert_eq!(table.lookup('b'), None);
    assert_eq!(table.len(), 1);
}

#[test]
fn code_points_can_share_a_tile() {
    let mut table = GlyphTable::new();
    let shared = table.push_tile(tile(0));
    for ch in ['\u{E000}', '\u{E001}', '\u{E002}'] {
        table.insert(
            ch,
            CachedGlyph {
                tile: shared,
                left: 0,
                top: 10,
            },
        );
    }
    assert_eq!(table.len(), 3);
    assert_eq!(table.tile_count(), 1);
    assert_eq!(table.get('\u{E001}').unwrap().tile, shared);
}

#[test]
#[should_panic(expected = "cached twice")]
#[cfg(debug_assertions)]
fn double_insert_is_caught_in_debug() {
    let mut table = GlyphTable::new();
    let t = table.push_tile(tile(0));
    let glyph = CachedGlyph {
        tile: t,
        left: 0,
        top: 0,
    };
    table.insert('x', glyph);
    table.insert('x', glyph);
}
