//! Pixel and UV rectangles, and the tile handle served to text consumers.

/// Axis-aligned rectangle in page pixels (origin top-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether this rectangle lies entirely inside a `width` x `height` page.
    pub const fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Normalized texture coordinates, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl UvRect {
    /// UVs for `rect` inside a page of the given size.
    pub fn from_pixels(rect: PixelRect, page_width: u32, page_height: u32) -> Self {
        let pw = page_width as f32;
        let ph = page_height as f32;
        Self {
            left: rect.x as f32 / pw,
            top: rect.y as f32 / ph,
            right: rect.right() as f32 / pw,
            bottom: rect.bottom() as f32 / ph,
        }
    }

    pub fn is_normalized(&self) -> bool {
        let unit = 0.0..=1.0;
        unit.contains(&self.left)
            && unit.contains(&self.top)
            && unit.contains(&self.right)
            && unit.contains(&self.bottom)
            && self.left <= self.right
            && self.top <= self.bottom
    }
}

/// Stable index of an atlas page within its font cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A glyph's home in the atlas: where its bitmap lives and how to sample it.
///
/// Tiles never move once created, so callers may hold them across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Tile slot in page pixels; the glyph bitmap sits at its top-left corner.
    pub px: PixelRect,
    pub uv: UvRect,
    pub page: PageId,
}

impl Tile {
    pub fn new(px: PixelRect, page: PageId, page_width: u32, page_height: u32) -> Self {
        Self {
            px,
            uv: UvRect::from_pixels(px, page_width, page_height),
            page,
        }
    }

    /// A tile with no pixels, for glyphs that draw nothing (e.g. space).
    pub fn empty(page: PageId) -> Self {
        Self {
            px: PixelRect::default(),
            uv: UvRect::default(),
            page,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.px.is_empty()
    }
}
