//! Rasterizer interface consumed by the font cache.
//!
//! The cache never decodes fonts itself. It asks a [`Rasterizer`] for vertical
//! metrics, per-glyph coverage bitmaps, and kerned advances. [`SwashRasterizer`]
//! is the stock implementation; tests and embedders can provide their own.

pub mod placeholder;
mod swash_raster;

pub use swash_raster::SwashRasterizer;

/// Font style variant. Part of a font instance's identity together with the
/// face and pixel size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Regular = 0,
    Bold = 1,
    Italic = 2,
    BoldItalic = 3,
}

impl FontStyle {
    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    pub const fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// Single-channel coverage bitmap for one glyph, plus its placement.
///
/// `left` and `top` are the bearings from the pen position on the baseline
/// to the bitmap's top-left corner (`top` grows upward, as in `FreeType`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    /// Row-major coverage, `width * height` bytes.
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `data` holds exactly `width * height` bytes.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize
    }

    /// Copy of this bitmap cut down to at most `max_width` x `max_height`,
    /// keeping the top-left corner.
    #[must_use]
    pub fn cropped(&self, max_width: u32, max_height: u32) -> Self {
        let width = self.width.min(max_width);
        let height = self.height.min(max_height);
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for row in self.data.chunks(self.width.max(1) as usize).take(height as usize) {
            data.extend_from_slice(&row[..width as usize]);
        }
        Self {
            width,
            height,
            left: self.left,
            top: self.top,
            data,
        }
    }
}

/// A font face at one pixel size and style that can turn code points into
/// bitmaps.
///
/// `rasterize` returning `None` means the face has no glyph for the code
/// point; that is not an error.
pub trait Rasterizer {
    /// Whether the underlying face loaded successfully.
    fn is_valid(&self) -> bool;

    /// Distance from the baseline to the top of the tallest glyph, in pixels.
    fn ascender(&self) -> f32;

    /// Baseline-to-baseline distance, in pixels.
    fn line_spacing(&self) -> f32;

    fn rasterize(&mut self, ch: char) -> Option<GlyphBitmap>;

    /// Horizontal advance after `ch`, kerned against `next` when the face has
    /// a kerning pair for them.
    fn advance_x(&self, ch: char, next: Option<char>) -> f32;
}
