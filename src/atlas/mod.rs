//! Atlas bookkeeping: tile geometry, packing, pages, and the glyph table.
//!
//! Nothing in here is ever freed while a font cache is alive. Tiles keep
//! their position, pages keep their index.

mod allocator;
mod page;
mod rect;
mod table;

pub use allocator::{Overflow, PackCursor, TileAllocator};
pub use page::{AtlasPage, PageSet, Reservation};
pub use rect::{PageId, PixelRect, Tile, UvRect};
pub use table::{CachedGlyph, GlyphTable};
