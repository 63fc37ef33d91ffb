//! CPU-memory graphics context.
//!
//! Pages are plain coverage buffers. Useful for headless text rendering,
//! for inspecting what the atlas actually contains, and for exercising the
//! cache's failure paths: a [`Fault`] makes page creation or upload fail
//! until it is cleared.

use crate::atlas::PixelRect;
use crate::error::GpuError;
use crate::font::GlyphBitmap;

use super::{GraphicsContext, PageDescriptor, UploadStrategy, check_page_size, check_upload};

/// Default texture limit, matching `wgpu::Limits::default()`.
const DEFAULT_MAX_TEXTURE_SIZE: u32 = 8192;

/// Simulated GPU failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    PageCreation,
    Upload,
}

/// Graphics context backed by CPU memory.
#[derive(Debug)]
pub struct SoftwareContext {
    max_texture_size: u32,
    fault: Option<Fault>,
    live_pages: usize,
    pages_created: usize,
    pages_destroyed: usize,
    uploads: usize,
}

impl Default for SoftwareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareContext {
    pub fn new() -> Self {
        Self::with_max_texture_size(DEFAULT_MAX_TEXTURE_SIZE)
    }

    pub fn with_max_texture_size(max_texture_size: u32) -> Self {
        Self {
            max_texture_size,
            fault: None,
            live_pages: 0,
            pages_created: 0,
            pages_destroyed: 0,
            uploads: 0,
        }
    }

    /// Make every matching call fail until [`clear_fault`](Self::clear_fault).
    pub fn set_fault(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// Pages created and not yet destroyed.
    pub fn live_pages(&self) -> usize {
        self.live_pages
    }

    pub fn pages_created(&self) -> usize {
        self.pages_created
    }

    pub fn pages_destroyed(&self) -> usize {
        self.pages_destroyed
    }

    /// Successful uploads.
    pub fn uploads(&self) -> usize {
        self.uploads
    }
}

/// One page of coverage pixels.
#[derive(Debug)]
pub struct SoftwarePage {
    index: u32,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Off-screen render target, present under [`UploadStrategy::RenderTarget`].
    target: Option<Vec<u8>>,
}

impl SoftwarePage {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_render_target(&self) -> bool {
        self.target.is_some()
    }

    /// Coverage at `(x, y)`, or `None` outside the page.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Copy `bitmap` rows into `buf` at `rect`.
    fn blit(buf: &mut [u8], stride: u32, rect: PixelRect, bitmap: &GlyphBitmap) {
        if rect.is_empty() {
            return;
        }
        for (row, src) in bitmap.data.chunks(bitmap.width as usize).enumerate() {
            let start = ((rect.y + row as u32) * stride + rect.x) as usize;
            buf[start..start + src.len()].copy_from_slice(src);
        }
    }
}

impl GraphicsContext for SoftwareContext {
    type Page = SoftwarePage;

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_page(&mut self, desc: &PageDescriptor) -> Result<SoftwarePage, GpuError> {
        if self.fault == Some(Fault::PageCreation) {
            return Err(GpuError::TextureCreation(format!(
                "{}: simulated failure",
                desc.label()
            )));
        }
        check_page_size(desc, self.max_texture_size)?;

        let len = desc.width as usize * desc.height as usize;
        let target = match desc.strategy {
            UploadStrategy::Direct => None,
            UploadStrategy::RenderTarget => Some(vec![0u8; len]),
        };
        self.live_pages += 1;
        self.pages_created += 1;
        Ok(SoftwarePage {
            index: desc.index,
            width: desc.width,
            height: desc.height,
            pixels: vec![0u8; len],
            target,
        })
    }

    fn upload(
        &mut self,
        page: &mut SoftwarePage,
        rect: PixelRect,
        bitmap: &GlyphBitmap,
    ) -> Result<(), GpuError> {
        if self.fault == Some(Fault::Upload) {
            return Err(GpuError::Upload {
                page: page.index,
                reason: "simulated failure".to_owned(),
            });
        }
        check_upload(page.index, page.width, page.height, rect, bitmap)?;

        let stride = page.width;
        match page.target.as_mut() {
            // Draw into the target, then resolve the rectangle into the texture.
            Some(target) => {
                SoftwarePage::blit(target, stride, rect, bitmap);
                for y in rect.y..rect.bottom() {
                    let start = (y * stride + rect.x) as usize;
                    let end = start + rect.width as usize;
                    page.pixels[start..end].copy_from_slice(&target[start..end]);
                }
            }
            None => SoftwarePage::blit(&mut page.pixels, stride, rect, bitmap),
        }
        self.uploads += 1;
        Ok(())
    }

    fn destroy_page(&mut self, page: SoftwarePage) {
        log::debug!("software: destroying page {}", page.index);
        self.live_pages = self.live_pages.saturating_sub(1);
        self.pages_destroyed += 1;
    }
}
