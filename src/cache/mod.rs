//! Font cache: the entry point that turns code points into atlas tiles.
//!
//! One `FontCache` exists per rasterizer (face, pixel size, style). It owns
//! its page set and glyph table outright. Each code point is rasterized and
//! uploaded once; every later request is a table lookup.
//!
//! ```text
//! render_glyph ─► table lookup ──hit──────────────────────────┐
//!                     │miss                                   ▼
//!                     └► rasterize ─► reserve ─► upload ─► commit ─► advance pen
//! ```
//!
//! GPU resources are never freed implicitly. Call [`FontCache::release`]
//! with the same context before that context goes away.

use crate::atlas::{
    AtlasPage, CachedGlyph, GlyphTable, PageId, PageSet, PixelRect, Tile, TileAllocator,
};
use crate::config::AtlasConfig;
use crate::error::{AtlasError, ConfigError, GpuError};
use crate::font::{GlyphBitmap, Rasterizer, placeholder};
use crate::gpu::GraphicsContext;

/// Printable ASCII, rasterized by `init` when `precache_ascii` is set.
const ASCII: std::ops::RangeInclusive<char> = ' '..='~';

/// Lifecycle of a font cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    /// Creating the first page.
    Initializing,
    Ready,
    /// GPU resources destroyed. Terminal.
    Released,
}

/// Baseline position of the next glyph, in pixels. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pen {
    pub x: f32,
    pub y: f32,
}

impl Pen {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle a glyph's tile is drawn into.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuadRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl QuadRect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// One positioned glyph, ready to be turned into vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub tile: Tile,
    pub rect: QuadRect,
    /// How far the pen moved past this glyph, kerning included.
    pub advance: f32,
}

/// Counters for one font cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub pages: usize,
    pub tiles: usize,
    pub glyphs: usize,
    /// Calls into the rasterizer, including ones whose upload later failed.
    pub rasterizations: usize,
    pub hits: usize,
    pub misses: usize,
}

/// Glyph atlas for one font instance.
pub struct FontCache<R: Rasterizer, C: GraphicsContext> {
    rasterizer: R,
    config: AtlasConfig,
    allocator: TileAllocator,
    ascender: f32,
    line_spacing: f32,
    state: CacheState,
    init_attempted: bool,
    pages: PageSet<C::Page>,
    table: GlyphTable,
    /// Shared tile for every code point the rasterizer has no glyph for.
    placeholder: Option<(CachedGlyph, Tile)>,
    /// Shared tile for glyphs that draw nothing.
    blank: Option<(usize, Tile)>,
    rasterizations: usize,
    hits: usize,
    misses: usize,
}

impl<R: Rasterizer, C: GraphicsContext> FontCache<R, C> {
    /// Check the rasterizer and geometry. No GPU work happens here.
    pub fn new(rasterizer: R, config: AtlasConfig) -> Result<Self, AtlasError> {
        if !rasterizer.is_valid() {
            return Err(ConfigError::InvalidRasterizer.into());
        }
        let ascender = rasterizer.ascender();
        let line_spacing = rasterizer.line_spacing();
        // Written this way round so NaN fails too.
        let positive = ascender > 0.0 && line_spacing > 0.0;
        if !positive {
            return Err(ConfigError::NonPositiveMetrics {
                ascender,
                line_spacing,
            }
            .into());
        }

        let tile = match config.tile_size {
            Some([w, h]) => (w, h),
            None => {
                let side = line_spacing.ceil() as u32;
                (side, side)
            }
        };
        config.validate(tile)?;
        let allocator = TileAllocator::new(tile.0, tile.1, config.page_width, config.page_height)?;

        Ok(Self {
            rasterizer,
            pages: PageSet::new(config.max_pages),
            config,
            allocator,
            ascender,
            line_spacing,
            state: CacheState::Uninitialized,
            init_attempted: false,
            table: GlyphTable::new(),
            placeholder: None,
            blank: None,
            rasterizations: 0,
            hits: 0,
            misses: 0,
        })
    }

    /// Create the first atlas page (and precache ASCII if configured).
    ///
    /// Called implicitly by the first `render_glyph`. On a GPU failure the
    /// cache stays `Uninitialized` and `init` may be retried.
    pub fn init(&mut self, ctx: &mut C) -> Result<(), AtlasError> {
        match self.state {
            CacheState::Ready => return Ok(()),
            CacheState::Released => return Err(self.misuse()),
            CacheState::Uninitialized | CacheState::Initializing => {}
        }

        self.init_attempted = true;
        self.state = CacheState::Initializing;
        if self.pages.is_empty() {
            if let Err(e) = self.pages.grow(ctx, &self.allocator, self.config.strategy) {
                self.state = CacheState::Uninitialized;
                log::warn!("font_cache: init failed: {e}");
                return Err(e.into());
            }
        }
        self.state = CacheState::Ready;
        log::debug!(
            "font_cache: ready, tile {:?}, {} tiles per page",
            self.allocator.tile_size(),
            self.allocator.slots_per_page()
        );

        if self.config.precache_ascii {
            self.precache(ctx, ASCII)?;
        }
        Ok(())
    }

    /// Whether setup has been attempted, successful or not.
    pub fn was_initialized(&self) -> bool {
        self.init_attempted
    }

    /// Whether the cache is ready and backed by at least one live page.
    pub fn is_valid(&self) -> bool {
        self.state == CacheState::Ready && self.pages.live_count() > 0
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn ascender(&self) -> f32 {
        self.ascender
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    pub fn tile_size(&self) -> (u32, u32) {
        self.allocator.tile_size()
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn tile_count(&self) -> usize {
        self.table.tile_count()
    }

    pub fn glyph_count(&self) -> usize {
        self.table.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pages: self.pages.len(),
            tiles: self.table.tile_count(),
            glyphs: self.table.len(),
            rasterizations: self.rasterizations,
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Backend handle for a page, for binding it in a draw call.
    ///
    /// `None` for unknown pages and after `release`.
    pub fn page(&self, id: PageId) -> Option<&C::Page> {
        self.pages.get(id).and_then(AtlasPage::resource)
    }

    /// Tile for `ch` if it is already cached.
    pub fn cached_tile(&self, ch: char) -> Option<Tile> {
        self.table.lookup(ch).map(|(_, tile)| tile)
    }

    /// Place `ch` at `pen` and advance the pen, kerning against `next`.
    ///
    /// Rasterizes and uploads `ch` on first use. On a GPU error nothing is
    /// cached and the pen is left alone, so the call can be repeated later.
    pub fn render_glyph(
        &mut self,
        ctx: &mut C,
        ch: char,
        next: Option<char>,
        pen: &mut Pen,
    ) -> Result<GlyphQuad, AtlasError> {
        let (glyph, tile) = self.ensure_cached(ctx, ch)?;
        let advance = self.rasterizer.advance_x(ch, next);

        let rect = QuadRect {
            left: pen.x + glyph.left as f32,
            top: pen.y - glyph.top as f32,
            width: tile.px.width as f32,
            height: tile.px.height as f32,
        };
        pen.x += advance;
        Ok(GlyphQuad {
            tile,
            rect,
            advance,
        })
    }

    /// Make sure every code point in `chars` is in the atlas.
    pub fn precache(
        &mut self,
        ctx: &mut C,
        chars: impl IntoIterator<Item = char>,
    ) -> Result<(), AtlasError> {
        for ch in chars {
            if !self.table.contains(ch) {
                self.ensure_cached(ctx, ch)?;
            }
        }
        Ok(())
    }

    /// Destroy every page's GPU resources. Further glyph requests fail with
    /// [`AtlasError::Released`]. Calling it again does nothing.
    pub fn release(&mut self, ctx: &mut C) {
        if self.state == CacheState::Released {
            return;
        }
        self.pages.release_all(ctx);
        self.state = CacheState::Released;
        log::debug!(
            "font_cache: released {} pages, {} glyphs",
            self.pages.len(),
            self.table.len()
        );
    }

    fn misuse(&self) -> AtlasError {
        log::error!("font_cache: used after release");
        AtlasError::Released
    }

    fn ensure_cached(&mut self, ctx: &mut C, ch: char) -> Result<(CachedGlyph, Tile), AtlasError> {
        match self.state {
            CacheState::Ready => {}
            CacheState::Released => return Err(self.misuse()),
            CacheState::Uninitialized | CacheState::Initializing => self.init(ctx)?,
        }

        if let Some(hit) = self.table.lookup(ch) {
            self.hits += 1;
            return Ok(hit);
        }
        self.misses += 1;

        let (glyph, tile) = self.load(ctx, ch).map_err(|e| {
            log::warn!("font_cache: failed to cache {ch:?}: {e}");
            AtlasError::from(e)
        })?;
        self.table.insert(ch, glyph);
        Ok((glyph, tile))
    }

    /// Rasterize and upload `ch`. Nothing is recorded on failure.
    fn load(&mut self, ctx: &mut C, ch: char) -> Result<(CachedGlyph, Tile), GpuError> {
        self.rasterizations += 1;
        let Some(bitmap) = self.rasterizer.rasterize(ch) else {
            log::debug!("font_cache: no glyph for {ch:?}, using placeholder");
            return self.placeholder(ctx);
        };
        if !bitmap.is_consistent() {
            log::warn!(
                "font_cache: {ch:?} bitmap has {} bytes for {}x{}, using placeholder",
                bitmap.data.len(),
                bitmap.width,
                bitmap.height
            );
            return self.placeholder(ctx);
        }
        if bitmap.is_empty() {
            let (index, tile) = self.blank_tile();
            let glyph = CachedGlyph {
                tile: index,
                left: bitmap.left,
                top: bitmap.top,
            };
            return Ok((glyph, tile));
        }

        let (tw, th) = self.allocator.tile_size();
        let bitmap = if bitmap.width > tw || bitmap.height > th {
            log::warn!(
                "font_cache: {ch:?} is {}x{}, cropping to {tw}x{th} tile",
                bitmap.width,
                bitmap.height
            );
            bitmap.cropped(tw, th)
        } else {
            bitmap
        };

        let (index, tile) = self.upload_tile(ctx, &bitmap)?;
        log::debug!(
            "font_cache: cached {ch:?} on page {} at {:?}",
            tile.page.0,
            (tile.px.x, tile.px.y)
        );
        let glyph = CachedGlyph {
            tile: index,
            left: bitmap.left,
            top: bitmap.top,
        };
        Ok((glyph, tile))
    }

    fn placeholder(&mut self, ctx: &mut C) -> Result<(CachedGlyph, Tile), GpuError> {
        if let Some(cached) = self.placeholder {
            return Ok(cached);
        }
        let (tw, th) = self.allocator.tile_size();
        let bitmap = placeholder::missing_glyph(tw, th, self.ascender);
        let (index, tile) = self.upload_tile(ctx, &bitmap)?;
        let glyph = CachedGlyph {
            tile: index,
            left: bitmap.left,
            top: bitmap.top,
        };
        self.placeholder = Some((glyph, tile));
        Ok((glyph, tile))
    }

    fn blank_tile(&mut self) -> (usize, Tile) {
        if let Some(blank) = self.blank {
            return blank;
        }
        let tile = Tile::empty(PageId(0));
        let blank = (self.table.push_tile(tile), tile);
        self.blank = Some(blank);
        blank
    }

    /// Reserve a tile, upload `bitmap` into its top-left corner, and commit.
    fn upload_tile(&mut self, ctx: &mut C, bitmap: &GlyphBitmap) -> Result<(usize, Tile), GpuError> {
        let reservation = self
            .pages
            .reserve(ctx, &self.allocator, self.config.strategy)?;
        let slot = reservation.rect;
        let rect = PixelRect::new(slot.x, slot.y, bitmap.width, bitmap.height);
        self.pages.upload(ctx, reservation.page, rect, bitmap)?;
        self.pages.commit(reservation);

        let (pw, ph) = self.allocator.page_size();
        let tile = Tile::new(slot, reservation.page, pw, ph);
        Ok((self.table.push_tile(tile), tile))
    }
}

impl<R: Rasterizer, C: GraphicsContext> Drop for FontCache<R, C> {
    fn drop(&mut self) {
        let live = self.pages.live_count();
        if live > 0 {
            log::warn!("font_cache: dropped with {live} live pages, call release() first");
        }
    }
}
