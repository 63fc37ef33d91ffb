//! Code point to tile mapping.

use std::collections::HashMap;

use super::rect::Tile;

/// One cached code point: which tile holds its bitmap, and where that
/// bitmap sits relative to the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedGlyph {
    /// Index into the table's tile list.
    pub tile: usize,
    /// Bearing from the pen to the bitmap's left edge.
    pub left: i32,
    /// Bearing from the baseline up to the bitmap's top edge.
    pub top: i32,
}

/// Append-only glyph cache table.
///
/// Tiles and entries are kept apart so several code points can share one
/// tile (the missing-glyph placeholder).
#[derive(Debug, Default)]
pub struct GlyphTable {
    index: HashMap<char, usize>,
    glyphs: Vec<CachedGlyph>,
    tiles: Vec<Tile>,
}

impl GlyphTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ch: char) -> Option<&CachedGlyph> {
        self.index.get(&ch).and_then(|&i| self.glyphs.get(i))
    }

    /// Entry for `ch` together with its tile.
    pub fn lookup(&self, ch: char) -> Option<(CachedGlyph, Tile)> {
        let glyph = *self.get(ch)?;
        let tile = *self.tiles.get(glyph.tile)?;
        Some((glyph, tile))
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Append a tile, returning its index.
    pub fn push_tile(&mut self, tile: Tile) -> usize {
        self.tiles.push(tile);
        self.tiles.len() - 1
    }

    /// Map `ch` to `glyph`. Each code point is inserted at most once.
    pub fn insert(&mut self, ch: char, glyph: CachedGlyph) {
        debug_assert!(!self.index.contains_key(&ch), "{ch:?} cached twice");
        debug_assert!(glyph.tile < self.tiles.len(), "dangling tile index");
        self.glyphs.push(glyph);
        self.index.insert(ch, self.glyphs.len() - 1);
    }

    /// Number of cached code points.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests;
