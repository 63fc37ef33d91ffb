//! Row-major tile allocator for a single atlas page.
//!
//! Tiles are packed left to right along the current row. When the row runs
//! out of horizontal room the cursor drops to a new row below the tallest
//! tile placed so far; when there is no vertical room left the page is full
//! and the caller must start a new one. Nothing is ever freed.

use crate::error::ConfigError;

use super::rect::PixelRect;

/// Packing position within one page. Each page owns one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackCursor {
    x: u32,
    y: u32,
    /// Height of the tallest tile in the current row.
    row_height: u32,
}

impl PackCursor {
    /// Next free pixel column and row.
    pub const fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }
}

/// The active page has no room left for the requested tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

/// Packs fixed-size glyph tiles into pages of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct TileAllocator {
    tile_width: u32,
    tile_height: u32,
    page_width: u32,
    page_height: u32,
}

impl TileAllocator {
    /// Validate the tile/page geometry. A page that cannot hold one tile is a
    /// configuration error, since growing the page set would never help.
    pub fn new(
        tile_width: u32,
        tile_height: u32,
        page_width: u32,
        page_height: u32,
    ) -> Result<Self, ConfigError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(ConfigError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        if page_width < tile_width || page_height < tile_height {
            return Err(ConfigError::PageTooSmall {
                page_width,
                page_height,
                tile_width,
                tile_height,
            });
        }
        Ok(Self {
            tile_width,
            tile_height,
            page_width,
            page_height,
        })
    }

    pub const fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub const fn page_size(&self) -> (u32, u32) {
        (self.page_width, self.page_height)
    }

    /// Number of uniform tiles one page holds.
    pub const fn slots_per_page(&self) -> u32 {
        (self.page_width / self.tile_width) * (self.page_height / self.tile_height)
    }

    /// Grid slot index of a uniform tile rectangle (row-major).
    pub const fn slot_of(&self, rect: PixelRect) -> u32 {
        let per_row = self.page_width / self.tile_width;
        (rect.y / self.tile_height) * per_row + rect.x / self.tile_width
    }

    /// Reserve one uniform tile.
    pub fn reserve_tile(&self, cursor: &mut PackCursor) -> Result<PixelRect, Overflow> {
        self.reserve(cursor, self.tile_width, self.tile_height)
    }

    /// Reserve a `width` x `height` rectangle, advancing `cursor`.
    ///
    /// On `Overflow` the cursor is left untouched.
    pub fn reserve(
        &self,
        cursor: &mut PackCursor,
        width: u32,
        height: u32,
    ) -> Result<PixelRect, Overflow> {
        if width > self.page_width || height > self.page_height {
            return Err(Overflow);
        }

        let mut x = cursor.x;
        let mut y = cursor.y;
        let mut row_height = cursor.row_height;

        // Row exhausted: start a new one below the tallest tile.
        if x + width > self.page_width {
            y += row_height;
            x = 0;
            row_height = 0;
        }
        if y + height > self.page_height {
            return Err(Overflow);
        }

        *cursor = PackCursor {
            x: x + width,
            y,
            row_height: row_height.max(height),
        };
        Ok(PixelRect::new(x, y, width, height))
    }
}

#[cfg(test)]
mod tests;
