//! Glyph quads grouped by atlas page.
//!
//! A text renderer binds one page texture per draw call, so quads are
//! bucketed by page in the order pages are first used. Building vertices
//! and issuing draws is left to the caller.

use crate::atlas::PageId;
use crate::cache::{FontCache, GlyphQuad, Pen};
use crate::error::AtlasError;
use crate::font::Rasterizer;
use crate::gpu::GraphicsContext;

/// Quads bucketed by the page their tile lives on.
#[derive(Debug, Clone, Default)]
pub struct PageBatches {
    batches: Vec<(PageId, Vec<GlyphQuad>)>,
}

impl PageBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quad to its page's batch. Quads with an empty tile draw nothing
    /// and are dropped.
    pub fn push(&mut self, quad: GlyphQuad) {
        if quad.tile.is_empty() {
            return;
        }
        let page = quad.tile.page;
        match self.batches.iter_mut().find(|(id, _)| *id == page) {
            Some((_, quads)) => quads.push(quad),
            None => self.batches.push((page, vec![quad])),
        }
    }

    /// Batches in first-use order.
    pub fn iter(&self) -> impl Iterator<Item = (PageId, &[GlyphQuad])> {
        self.batches.iter().map(|(id, quads)| (*id, quads.as_slice()))
    }

    /// Number of distinct pages, i.e. draw calls.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(|(_, quads)| quads.len()).sum()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

/// Place `text` starting at `origin` and return the batches plus the pen
/// position after the last glyph.
///
/// `'\n'` returns the pen to `origin.x` one line lower. Other control
/// characters are skipped. There is no wrapping or alignment.
pub fn layout_line<R, C>(
    cache: &mut FontCache<R, C>,
    ctx: &mut C,
    text: &str,
    origin: Pen,
) -> Result<(PageBatches, Pen), AtlasError>
where
    R: Rasterizer,
    C: GraphicsContext,
{
    let mut batches = PageBatches::new();
    let mut pen = origin;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            pen.x = origin.x;
            pen.y += cache.line_spacing();
            continue;
        }
        if ch.is_control() {
            continue;
        }
        // Only kern against a glyph that will actually follow on this line.
        let next = chars.peek().copied().filter(|n| !n.is_control());
        batches.push(cache.render_glyph(ctx, ch, next, &mut pen)?);
    }
    Ok((batches, pen))
}
