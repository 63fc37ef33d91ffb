//! `swash`-backed rasterizer with legacy `kern` table pair kerning.
//!
//! Pairs stored only in `GPOS` (common in newer faces) are not applied, so
//! such fonts render with plain advances.

use std::ops::Range;
use std::sync::Arc;

use rustybuzz::ttf_parser;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::{Angle, Format, Transform};
use swash::{CacheKey, FontRef};

use super::{FontStyle, GlyphBitmap, Rasterizer};

/// Horizontal skew for synthetic italics.
const SYNTHETIC_ITALIC_DEGREES: f32 = 14.0;

/// One face at one pixel size and style.
///
/// Font bytes are shared through an `Arc` so several sizes of the same face
/// (one font cache each) do not duplicate the file.
pub struct SwashRasterizer {
    data: Arc<Vec<u8>>,
    /// Table directory offset and cache key from `FontRef::from_index`.
    /// `None` when the bytes are not a usable font.
    face: Option<(u32, CacheKey)>,
    size: f32,
    style: FontStyle,
    ascender: f32,
    line_spacing: f32,
    units_per_em: f32,
    /// Byte range of the face's `kern` table within `data`.
    kern: Option<Range<usize>>,
    scale_context: ScaleContext,
}

/// Create a transient swash `FontRef` over the shared bytes.
fn font_ref(data: &[u8], offset: u32, key: CacheKey) -> FontRef<'_> {
    FontRef { data, offset, key }
}

impl SwashRasterizer {
    /// Parse `data` and prepare face `face_index` at `size` pixels.
    ///
    /// Never fails: an unparsable font produces a rasterizer whose
    /// [`Rasterizer::is_valid`] is false, which the font cache rejects.
    pub fn from_bytes(
        data: impl Into<Arc<Vec<u8>>>,
        face_index: u32,
        size: f32,
        style: FontStyle,
    ) -> Self {
        let data = data.into();
        let face = FontRef::from_index(&data, face_index as usize).map(|fr| (fr.offset, fr.key));

        let (ascender, line_spacing, units_per_em) = match face {
            Some((offset, key)) => {
                let fr = font_ref(&data, offset, key);
                let units_per_em = f32::from(fr.metrics(&[]).units_per_em);
                let m = fr.metrics(&[]).scale(size);
                (
                    m.ascent,
                    m.ascent + m.descent.abs() + m.leading,
                    units_per_em,
                )
            }
            None => {
                log::warn!("font: face {face_index} is not a valid font");
                (0.0, 0.0, 0.0)
            }
        };
        let kern = face.and_then(|_| kern_table_range(&data, face_index));

        Self {
            data,
            face,
            size,
            style,
            ascender,
            line_spacing,
            units_per_em,
            kern,
            scale_context: ScaleContext::new(),
        }
    }

    /// Read and parse a font file from disk.
    pub fn from_path(
        path: &std::path::Path,
        face_index: u32,
        size: f32,
        style: FontStyle,
    ) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(data, face_index, size, style))
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    fn glyph_id(&self, ch: char) -> u16 {
        self.face
            .map_or(0, |(offset, key)| font_ref(&self.data, offset, key).charmap().map(ch))
    }

    /// Pair kerning from the `kern` table, in pixels.
    fn kerning(&self, left: u16, right: u16) -> f32 {
        if left == 0 || right == 0 || self.units_per_em <= 0.0 {
            return 0.0;
        }
        let Some(kern) = self
            .kern
            .clone()
            .and_then(|range| self.data.get(range))
            .and_then(ttf_parser::kern::Table::parse)
        else {
            return 0.0;
        };
        let units = kern
            .subtables
            .into_iter()
            .filter(|st| st.horizontal && !st.variable)
            .find_map(|st| {
                st.glyphs_kerning(ttf_parser::GlyphId(left), ttf_parser::GlyphId(right))
            })
            .unwrap_or(0);
        f32::from(units) * self.size / self.units_per_em
    }
}

/// Locate face `face_index`'s `kern` table once, so kerning lookups only
/// parse that table's header.
fn kern_table_range(data: &[u8], face_index: u32) -> Option<Range<usize>> {
    let raw = ttf_parser::RawFace::parse(data, face_index).ok()?;
    let tag = ttf_parser::Tag::from_bytes(b"kern");
    let record = raw.table_records.into_iter().find(|r| r.tag == tag)?;
    let start = record.offset as usize;
    let end = start.checked_add(record.length as usize)?;
    (end <= data.len()).then_some(start..end)
}

impl Rasterizer for SwashRasterizer {
    fn is_valid(&self) -> bool {
        self.face.is_some() && self.size > 0.0
    }

    fn ascender(&self) -> f32 {
        self.ascender
    }

    fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    fn rasterize(&mut self, ch: char) -> Option<GlyphBitmap> {
        let (offset, key) = self.face?;
        let fr = font_ref(&self.data, offset, key);
        let glyph_id = fr.charmap().map(ch);
        if glyph_id == 0 {
            return None;
        }

        let mut scaler = self
            .scale_context
            .builder(fr)
            .size(self.size)
            .hint(true)
            .build();
        let mut render = Render::new(&[Source::Outline]);
        render.format(Format::Alpha);
        if self.style.is_bold() {
            render.embolden(0.5 + self.size / 48.0);
        }
        if self.style.is_italic() {
            render.transform(Some(Transform::skew(
                Angle::from_degrees(SYNTHETIC_ITALIC_DEGREES),
                Angle::from_degrees(0.0),
            )));
        }

        // A mapped glyph without an outline (space, format controls) draws nothing.
        let Some(image) = render.render(&mut scaler, glyph_id) else {
            return Some(GlyphBitmap::default());
        };
        Some(GlyphBitmap {
            width: image.placement.width,
            height: image.placement.height,
            left: image.placement.left,
            top: image.placement.top,
            data: image.data,
        })
    }

    /// Advance from `hmtx`, plus the `kern` table adjustment for the pair.
    /// Faces that keep their pairs only in `GPOS` get the plain advance.
    fn advance_x(&self, ch: char, next: Option<char>) -> f32 {
        let Some((offset, key)) = self.face else {
            return 0.0;
        };
        let glyph_id = self.glyph_id(ch);
        let advance = font_ref(&self.data, offset, key)
            .glyph_metrics(&[])
            .scale(self.size)
            .advance_width(glyph_id);
        let kern = next.map_or(0.0, |n| self.kerning(glyph_id, self.glyph_id(n)));
        advance + kern
    }
}

#[cfg(test)]
mod tests;
