//! wgpu-backed graphics context.
//!
//! Each atlas page is one `R8Unorm` texture holding glyph coverage. Under
//! [`UploadStrategy::RenderTarget`] a page also owns a renderable texture of
//! the same size: it is cleared with a render pass when the page is created,
//! glyphs are written into it, and the touched rectangle is copied into the
//! sampled texture on the GPU.
//!
//! Sizes and rectangles are checked against the device limits and page
//! bounds before a request is issued. Whatever wgpu still rejects
//! (validation, out of memory) is caught with error scopes and returned as a
//! [`GpuError`], as is any call made after the device was lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::atlas::PixelRect;
use crate::error::GpuError;
use crate::font::GlyphBitmap;

use super::{GraphicsContext, PageDescriptor, UploadStrategy, check_page_size, check_upload};

const ATLAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Device and queue used to create and fill atlas pages.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// Set by the device-lost callback.
    lost: Arc<AtomicBool>,
}

impl WgpuContext {
    /// Wrap a device the application already owns.
    ///
    /// Installs the device's lost callback, replacing any set earlier.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let lost = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            log::warn!("wgpu: device lost ({reason:?}) {message}");
            flag.store(true, Ordering::Release);
        });
        Self {
            device,
            queue,
            lost,
        }
    }

    /// Create a device with no surface, for offscreen rendering and tests.
    pub fn headless() -> Result<Self, GpuError> {
        let backends = wgpu::Backends::all();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        // Prefer a discrete GPU, fall back to whatever is there.
        let mut adapter: Option<wgpu::Adapter> = None;
        let mut fallback: Option<wgpu::Adapter> = None;
        for a in pollster::block_on(instance.enumerate_adapters(backends)) {
            if a.get_info().device_type == wgpu::DeviceType::DiscreteGpu {
                adapter = Some(a);
                break;
            }
            if fallback.is_none() {
                fallback = Some(a);
            }
        }
        let adapter = adapter
            .or(fallback)
            .ok_or_else(|| GpuError::DeviceUnavailable("no adapter found".to_owned()))?;
        log::debug!("wgpu: headless adapter {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("ori_atlas"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        }))
        .map_err(|e| GpuError::DeviceUnavailable(e.to_string()))?;

        Ok(Self::new(device, queue))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }

    /// Fail fast once the device is gone. Polling lets wgpu run the lost
    /// callback for a device destroyed since the last call.
    fn check_alive(&self) -> Result<(), GpuError> {
        if !self.is_lost() {
            if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
                log::debug!("wgpu: poll failed: {e}");
            }
        }
        if self.is_lost() {
            return Err(GpuError::DeviceUnavailable("device lost".to_owned()));
        }
        Ok(())
    }

    /// Run `f` inside out-of-memory and validation error scopes and return
    /// the first error either of them caught.
    fn scoped<T>(&self, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
        let oom = self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        // Innermost scope first.
        let invalid = pollster::block_on(validation.pop());
        let out_of_memory = pollster::block_on(oom.pop());
        (value, out_of_memory.or(invalid))
    }

    fn create_texture(
        &self,
        label: &str,
        desc: &PageDescriptor,
        usage: wgpu::TextureUsages,
    ) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ATLAS_FORMAT,
            usage,
            view_formats: &[],
        })
    }

    /// Fill the render target with zero coverage.
    fn clear_target(&self, target: &wgpu::Texture) {
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("atlas_clear"),
            });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("atlas_clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn write(&self, texture: &wgpu::Texture, rect: PixelRect, bitmap: &GlyphBitmap) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: origin(rect),
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width),
                rows_per_image: Some(bitmap.height),
            },
            extent(rect),
        );
    }
}

fn origin(rect: PixelRect) -> wgpu::Origin3d {
    wgpu::Origin3d {
        x: rect.x,
        y: rect.y,
        z: 0,
    }
}

fn extent(rect: PixelRect) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: rect.width,
        height: rect.height,
        depth_or_array_layers: 1,
    }
}

/// One atlas page on the GPU.
pub struct WgpuPage {
    index: u32,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    target: Option<wgpu::Texture>,
}

impl WgpuPage {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sampled texture holding glyph coverage.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// View for binding the page in a text pipeline.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn render_target(&self) -> Option<&wgpu::Texture> {
        self.target.as_ref()
    }
}

impl GraphicsContext for WgpuContext {
    type Page = WgpuPage;

    fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn create_page(&mut self, desc: &PageDescriptor) -> Result<WgpuPage, GpuError> {
        self.check_alive()?;
        check_page_size(desc, self.max_texture_size())?;

        let label = desc.label();
        let ((texture, view, target), error) = self.scoped(|| {
            let texture = self.create_texture(
                &label,
                desc,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            );
            let target = match desc.strategy {
                UploadStrategy::Direct => None,
                UploadStrategy::RenderTarget => {
                    let target = self.create_texture(
                        &format!("{label}_target"),
                        desc,
                        wgpu::TextureUsages::RENDER_ATTACHMENT
                            | wgpu::TextureUsages::COPY_SRC
                            | wgpu::TextureUsages::COPY_DST,
                    );
                    self.clear_target(&target);
                    Some(target)
                }
            };
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view, target)
        });
        if let Some(e) = error {
            self.check_alive()?;
            log::warn!("wgpu: creating {label} failed: {e}");
            return Err(GpuError::TextureCreation(format!("{label}: {e}")));
        }
        log::debug!(
            "wgpu: created {label} {}x{} ({:?})",
            desc.width,
            desc.height,
            desc.strategy
        );

        Ok(WgpuPage {
            index: desc.index,
            width: desc.width,
            height: desc.height,
            texture,
            view,
            target,
        })
    }

    fn upload(
        &mut self,
        page: &mut WgpuPage,
        rect: PixelRect,
        bitmap: &GlyphBitmap,
    ) -> Result<(), GpuError> {
        self.check_alive()?;
        check_upload(page.index, page.width, page.height, rect, bitmap)?;
        if rect.is_empty() {
            return Ok(());
        }

        let ((), error) = self.scoped(|| match &page.target {
            None => self.write(&page.texture, rect, bitmap),
            Some(target) => {
                self.write(target, rect, bitmap);
                let mut encoder =
                    self.device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("atlas_resolve"),
                        });
                encoder.copy_texture_to_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: target,
                        mip_level: 0,
                        origin: origin(rect),
                        aspect: wgpu::TextureAspect::All,
                    },
                    wgpu::TexelCopyTextureInfo {
                        texture: &page.texture,
                        mip_level: 0,
                        origin: origin(rect),
                        aspect: wgpu::TextureAspect::All,
                    },
                    extent(rect),
                );
                self.queue.submit(std::iter::once(encoder.finish()));
            }
        });
        match error {
            None => Ok(()),
            Some(e) => {
                self.check_alive()?;
                Err(GpuError::Upload {
                    page: page.index,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn destroy_page(&mut self, page: WgpuPage) {
        log::debug!("wgpu: destroying glyph_atlas_page_{}", page.index);
        // A lost device already freed everything; dropping the handles is enough.
        if self.is_lost() {
            return;
        }
        if let Some(target) = page.target {
            target.destroy();
        }
        page.texture.destroy();
    }
}

#[cfg(test)]
mod tests;
