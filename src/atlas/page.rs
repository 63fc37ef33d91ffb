//! Atlas pages and the append-only page set.
//!
//! A page pairs a backend resource (texture, plus render target under
//! [`UploadStrategy::RenderTarget`]) with the packing cursor for its tiles.
//! The set only grows. Page indices are stable until the owning font cache
//! is dropped, and a released page keeps its slot in the list.

use crate::error::GpuError;
use crate::font::GlyphBitmap;
use crate::gpu::{GraphicsContext, PageDescriptor, UploadStrategy};

use super::allocator::{Overflow, PackCursor, TileAllocator};
use super::rect::{PageId, PixelRect};

/// One texture page of the atlas.
#[derive(Debug)]
pub struct AtlasPage<P> {
    id: PageId,
    width: u32,
    height: u32,
    cursor: PackCursor,
    tiles: usize,
    resource: Option<P>,
}

impl<P> AtlasPage<P> {
    pub fn new(id: PageId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            cursor: PackCursor::default(),
            tiles: 0,
            resource: None,
        }
    }

    pub const fn id(&self) -> PageId {
        self.id
    }

    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub const fn cursor(&self) -> PackCursor {
        self.cursor
    }

    /// Tiles committed to this page.
    pub const fn tile_count(&self) -> usize {
        self.tiles
    }

    pub const fn is_created(&self) -> bool {
        self.resource.is_some()
    }

    /// Backend resource, if the page is currently created.
    pub const fn resource(&self) -> Option<&P> {
        self.resource.as_ref()
    }

    /// Allocate the backend resource unless it already exists.
    pub fn ensure_created<C>(&mut self, ctx: &mut C, strategy: UploadStrategy) -> Result<(), GpuError>
    where
        C: GraphicsContext<Page = P>,
    {
        if self.resource.is_some() {
            return Ok(());
        }
        let desc = PageDescriptor {
            index: self.id.0,
            width: self.width,
            height: self.height,
            strategy,
        };
        self.resource = Some(ctx.create_page(&desc)?);
        log::debug!(
            "atlas: created page {} ({}x{}, {strategy:?})",
            self.id.0,
            self.width,
            self.height
        );
        Ok(())
    }

    pub fn upload<C>(
        &mut self,
        ctx: &mut C,
        rect: PixelRect,
        bitmap: &GlyphBitmap,
    ) -> Result<(), GpuError>
    where
        C: GraphicsContext<Page = P>,
    {
        let Some(resource) = self.resource.as_mut() else {
            return Err(GpuError::Upload {
                page: self.id.0,
                reason: "page texture not created".to_owned(),
            });
        };
        ctx.upload(resource, rect, bitmap)
    }

    /// Destroy the backend resource. No-op when it was never created or has
    /// already been released.
    pub fn release<C>(&mut self, ctx: &mut C)
    where
        C: GraphicsContext<Page = P>,
    {
        if let Some(resource) = self.resource.take() {
            ctx.destroy_page(resource);
            log::debug!("atlas: released page {}", self.id.0);
        }
    }

    fn try_reserve(&self, allocator: &TileAllocator) -> Result<(PixelRect, PackCursor), Overflow> {
        let mut cursor = self.cursor;
        let rect = allocator.reserve_tile(&mut cursor)?;
        Ok((rect, cursor))
    }
}

/// Tile space held for one glyph until its upload succeeds.
///
/// Dropping a reservation without committing it leaves the page as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Reservation {
    pub page: PageId,
    pub rect: PixelRect,
    cursor: PackCursor,
}

/// Ordered, append-only list of atlas pages with an upper bound.
#[derive(Debug)]
pub struct PageSet<P> {
    pages: Vec<AtlasPage<P>>,
    max_pages: usize,
}

impl<P> PageSet<P> {
    pub fn new(max_pages: usize) -> Self {
        Self {
            pages: Vec::new(),
            max_pages,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub const fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn get(&self, id: PageId) -> Option<&AtlasPage<P>> {
        self.pages.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AtlasPage<P>> {
        self.pages.iter()
    }

    /// Pages whose backend resource is still alive.
    pub fn live_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_created()).count()
    }

    /// Append a new, created page.
    ///
    /// Fails with [`GpuError::PageLimit`] once `max_pages` pages exist. A page
    /// whose creation fails is not added.
    pub fn grow<C>(
        &mut self,
        ctx: &mut C,
        allocator: &TileAllocator,
        strategy: UploadStrategy,
    ) -> Result<PageId, GpuError>
    where
        C: GraphicsContext<Page = P>,
    {
        if self.pages.len() >= self.max_pages {
            return Err(GpuError::PageLimit {
                max: self.max_pages,
            });
        }
        let id = PageId(self.pages.len() as u32);
        let (width, height) = allocator.page_size();
        let mut page = AtlasPage::new(id, width, height);
        page.ensure_created(ctx, strategy)?;
        self.pages.push(page);
        Ok(id)
    }

    /// Find room for one tile on the active (last) page, growing the set
    /// when it is full. The page cursor is not moved until
    /// [`commit`](Self::commit).
    pub fn reserve<C>(
        &mut self,
        ctx: &mut C,
        allocator: &TileAllocator,
        strategy: UploadStrategy,
    ) -> Result<Reservation, GpuError>
    where
        C: GraphicsContext<Page = P>,
    {
        if let Some(page) = self.pages.last() {
            if let Ok((rect, cursor)) = page.try_reserve(allocator) {
                return Ok(Reservation {
                    page: page.id,
                    rect,
                    cursor,
                });
            }
        }

        let id = self.grow(ctx, allocator, strategy)?;
        let page = &self.pages[id.index()];
        // The allocator rejects geometries where an empty page can't hold a
        // tile, so this only fails if the set is misused with another one.
        let (rect, cursor) = page.try_reserve(allocator).map_err(|Overflow| {
            GpuError::TextureCreation(format!(
                "page {} cannot hold a {:?} tile",
                id.0,
                allocator.tile_size()
            ))
        })?;
        Ok(Reservation {
            page: id,
            rect,
            cursor,
        })
    }

    /// Upload `bitmap` into page `id`.
    pub fn upload<C>(
        &mut self,
        ctx: &mut C,
        id: PageId,
        rect: PixelRect,
        bitmap: &GlyphBitmap,
    ) -> Result<(), GpuError>
    where
        C: GraphicsContext<Page = P>,
    {
        match self.pages.get_mut(id.index()) {
            Some(page) => page.upload(ctx, rect, bitmap),
            None => Err(GpuError::Upload {
                page: id.0,
                reason: "no such page".to_owned(),
            }),
        }
    }

    /// Make a reservation permanent.
    pub fn commit(&mut self, reservation: Reservation) {
        if let Some(page) = self.pages.get_mut(reservation.page.index()) {
            page.cursor = reservation.cursor;
            page.tiles += 1;
        }
    }

    /// Release every page's backend resource. Safe to call repeatedly.
    pub fn release_all<C>(&mut self, ctx: &mut C)
    where
        C: GraphicsContext<Page = P>,
    {
        for page in &mut self.pages {
            page.release(ctx);
        }
    }
}
