//! Scripted rasterizer for unit tests.

use std::collections::{HashMap, HashSet};

use crate::font::{GlyphBitmap, Rasterizer};

/// Monospace fake font: every glyph is a solid `glyph_width` x
/// `glyph_height` block sitting on the baseline, except spaces (empty) and
/// code points marked missing.
#[derive(Debug, Clone)]
pub struct MockRasterizer {
    valid: bool,
    ascender: f32,
    line_spacing: f32,
    advance: f32,
    glyph_width: u32,
    glyph_height: u32,
    missing: HashSet<char>,
    kerning: HashMap<(char, char), f32>,
    calls: HashMap<char, usize>,
}

impl Default for MockRasterizer {
    fn default() -> Self {
        Self {
            valid: true,
            ascender: 12.0,
            line_spacing: 16.0,
            advance: 8.0,
            glyph_width: 7,
            glyph_height: 10,
            missing: HashSet::new(),
            kerning: HashMap::new(),
            calls: HashMap::new(),
        }
    }
}

impl MockRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle whose face failed to load.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            valid: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, ascender: f32, line_spacing: f32) -> Self {
        self.ascender = ascender;
        self.line_spacing = line_spacing;
        self
    }

    #[must_use]
    pub fn with_glyph_size(mut self, width: u32, height: u32) -> Self {
        self.glyph_width = width;
        self.glyph_height = height;
        self
    }

    #[must_use]
    pub fn with_missing(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.missing.extend(chars);
        self
    }

    /// Add a kerning adjustment (negative tightens) for the pair.
    #[must_use]
    pub fn with_kerning(mut self, left: char, right: char, adjust: f32) -> Self {
        self.kerning.insert((left, right), adjust);
        self
    }

    /// Times `rasterize` was called for `ch`.
    pub fn calls_for(&self, ch: char) -> usize {
        self.calls.get(&ch).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.values().sum()
    }
}

impl Rasterizer for MockRasterizer {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn ascender(&self) -> f32 {
        self.ascender
    }

    fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    fn rasterize(&mut self, ch: char) -> Option<GlyphBitmap> {
        *self.calls.entry(ch).or_default() += 1;
        if self.missing.contains(&ch) {
            return None;
        }
        if ch == ' ' {
            return Some(GlyphBitmap::default());
        }
        let (w, h) = (self.glyph_width, self.glyph_height);
        Some(GlyphBitmap {
            width: w,
            height: h,
            left: 1,
            top: h as i32,
            // Tag each glyph's coverage with its code point.
            data: vec![(ch as u32 % 251) as u8 + 1; (w * h) as usize],
        })
    }

    fn advance_x(&self, ch: char, next: Option<char>) -> f32 {
        let kern = next
            .and_then(|n| self.kerning.get(&(ch, n)))
            .copied()
            .unwrap_or(0.0);
        self.advance + kern
    }
}
