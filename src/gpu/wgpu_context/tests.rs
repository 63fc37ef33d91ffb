//! These tests need a GPU adapter. They pass trivially on machines
//! without one.

use crate::atlas::PixelRect;
use crate::error::GpuError;
use crate::font::GlyphBitmap;
use crate::gpu::{GraphicsContext, PageDescriptor, UploadStrategy};

use super::WgpuContext;

fn context() -> Option<WgpuContext> {
    match WgpuContext::headless() {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

fn desc(strategy: UploadStrategy) -> PageDescriptor {
    PageDescriptor {
        index: 3,
        width: 64,
        height: 64,
        strategy,
    }
}

fn bitmap() -> GlyphBitmap {
    GlyphBitmap {
        width: 5,
        height: 7,
        left: 1,
        top: 7,
        data: vec![0xFF; 35],
    }
}

#[test]
fn direct_page_round_trip() {
    let Some(mut ctx) = context() else { return };
    let mut page = ctx.create_page(&desc(UploadStrategy::Direct)).unwrap();
    assert_eq!(page.size(), (64, 64));
    assert_eq!(page.index(), 3);
    assert!(page.render_target().is_none());

    ctx.upload(&mut page, PixelRect::new(10, 10, 5, 7), &bitmap())
        .unwrap();
    ctx.destroy_page(page);
}

#[test]
fn render_target_page_round_trip() {
    let Some(mut ctx) = context() else { return };
    let mut page = ctx.create_page(&desc(UploadStrategy::RenderTarget)).unwrap();
    assert!(page.render_target().is_some());

    ctx.upload(&mut page, PixelRect::new(0, 0, 5, 7), &bitmap())
        .unwrap();
    ctx.destroy_page(page);
}

#[test]
fn oversized_page_is_rejected_before_reaching_the_device() {
    let Some(mut ctx) = context() else { return };
    let max = ctx.max_texture_size();
    let too_big = PageDescriptor {
        width: max + 1,
        ..desc(UploadStrategy::Direct)
    };
    assert!(matches!(
        ctx.create_page(&too_big),
        Err(GpuError::TextureTooLarge { .. })
    ));
}

#[test]
fn upload_outside_page_is_rejected() {
    let Some(mut ctx) = context() else { return };
    let mut page = ctx.create_page(&desc(UploadStrategy::Direct)).unwrap();
    let err = ctx
        .upload(&mut page, PixelRect::new(62, 0, 5, 7), &bitmap())
        .unwrap_err();
    assert!(matches!(err, GpuError::Upload { page: 3, .. }));
    ctx.destroy_page(page);
}

#[test]
fn lost_device_is_reported_as_an_error() {
    let Some(mut ctx) = context() else { return };
    let mut page = ctx.create_page(&desc(UploadStrategy::Direct)).unwrap();

    ctx.device().destroy();
    assert!(matches!(
        ctx.create_page(&desc(UploadStrategy::Direct)),
        Err(GpuError::DeviceUnavailable(_))
    ));
    assert!(ctx.is_lost());
    assert!(matches!(
        ctx.upload(&mut page, PixelRect::new(0, 0, 5, 7), &bitmap()),
        Err(GpuError::DeviceUnavailable(_))
    ));
    ctx.destroy_page(page);
}

#[test]
fn lost_device_during_render_target_setup_is_an_error() {
    let Some(mut ctx) = context() else { return };
    ctx.device().destroy();
    assert!(matches!(
        ctx.create_page(&desc(UploadStrategy::RenderTarget)),
        Err(GpuError::DeviceUnavailable(_))
    ));
}

#[test]
fn font_cache_survives_device_loss() {
    use crate::cache::{FontCache, Pen};
    use crate::config::AtlasConfig;
    use crate::error::AtlasError;
    use crate::testing::MockRasterizer;

    let Some(mut ctx) = context() else { return };
    let mut cache = FontCache::new(MockRasterizer::new(), AtlasConfig::default()).unwrap();
    cache
        .render_glyph(&mut ctx, 'a', None, &mut Pen::default())
        .unwrap();

    ctx.device().destroy();
    let err = cache
        .render_glyph(&mut ctx, 'b', None, &mut Pen::default())
        .unwrap_err();
    assert!(matches!(err, AtlasError::Gpu(GpuError::DeviceUnavailable(_))));
    assert!(err.is_recoverable());
    assert_eq!(cache.glyph_count(), 1);
    cache.release(&mut ctx);
}
