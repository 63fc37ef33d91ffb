//! Graphics context abstraction: atlas page textures and bitmap uploads.
//!
//! The font cache treats the context as opaque. It only asks for a page
//! texture to be created, a bitmap to be written into a rectangle of it, and
//! the texture to be destroyed again. How a page receives pixels is picked
//! once per font cache through [`UploadStrategy`].

mod software;
mod wgpu_context;

pub use software::{Fault, SoftwareContext, SoftwarePage};
pub use wgpu_context::{WgpuContext, WgpuPage};

use serde::{Deserialize, Serialize};

use crate::atlas::PixelRect;
use crate::error::GpuError;
use crate::font::GlyphBitmap;

/// How glyph bitmaps reach a page texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    /// Write pixels straight into the sampled texture.
    #[default]
    Direct,
    /// The page also owns an off-screen render target. It is cleared by
    /// rendering and glyphs arrive through a GPU-side copy.
    RenderTarget,
}

/// Everything a context needs to create one atlas page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub strategy: UploadStrategy,
}

impl PageDescriptor {
    pub fn label(&self) -> String {
        format!("glyph_atlas_page_{}", self.index)
    }
}

/// Owner of GPU resources for atlas pages.
///
/// All calls happen on the thread that owns the context. `destroy_page`
/// consumes the page, so a page can't be freed twice.
pub trait GraphicsContext {
    /// Backend texture (plus render target) for one page.
    type Page;

    /// Largest texture dimension the device supports.
    fn max_texture_size(&self) -> u32;

    fn create_page(&mut self, desc: &PageDescriptor) -> Result<Self::Page, GpuError>;

    /// Write `bitmap` into `rect` of `page`. `rect` matches the bitmap size.
    fn upload(
        &mut self,
        page: &mut Self::Page,
        rect: PixelRect,
        bitmap: &GlyphBitmap,
    ) -> Result<(), GpuError>;

    fn destroy_page(&mut self, page: Self::Page);
}

/// Reject page sizes the device can't allocate.
pub(crate) fn check_page_size(desc: &PageDescriptor, max: u32) -> Result<(), GpuError> {
    if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
        return Err(GpuError::TextureTooLarge {
            width: desc.width,
            height: desc.height,
            max,
        });
    }
    Ok(())
}

/// Validate an upload before it reaches the backend.
pub(crate) fn check_upload(
    page: u32,
    page_width: u32,
    page_height: u32,
    rect: PixelRect,
    bitmap: &GlyphBitmap,
) -> Result<(), GpuError> {
    let reason = if !bitmap.is_consistent() {
        format!(
            "bitmap holds {} bytes, expected {}x{}",
            bitmap.data.len(),
            bitmap.width,
            bitmap.height
        )
    } else if bitmap.width != rect.width || bitmap.height != rect.height {
        format!(
            "bitmap {}x{} does not match rect {}x{}",
            bitmap.width, bitmap.height, rect.width, rect.height
        )
    } else if !rect.fits_within(page_width, page_height) {
        format!("rect {rect:?} outside {page_width}x{page_height} page")
    } else {
        return Ok(());
    };
    Err(GpuError::Upload { page, reason })
}
