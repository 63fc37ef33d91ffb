//! Glyph texture-atlas cache for GPU text rendering.
//!
//! A [`FontCache`] turns code points into tiles on a growing set of atlas
//! page textures. Every code point is rasterized and uploaded once, then
//! served from a table. Text renderers get back positioned quads plus the
//! tile's UVs and page, and group their draw calls by page (see [`batch`]).
//!
//! Fonts come in through the [`Rasterizer`] trait ([`SwashRasterizer`] for
//! real font files). GPU resources go through the [`GraphicsContext`] trait,
//! with a `wgpu` backend and a CPU backend.

#![deny(unsafe_code)]

pub mod atlas;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod font;
pub mod gpu;

#[cfg(test)]
mod testing;

pub use atlas::{PageId, PixelRect, Tile, UvRect};
pub use batch::{PageBatches, layout_line};
pub use cache::{CacheState, CacheStats, FontCache, GlyphQuad, Pen, QuadRect};
pub use config::AtlasConfig;
pub use error::{AtlasError, ConfigError, GpuError};
pub use font::{FontStyle, GlyphBitmap, Rasterizer, SwashRasterizer};
pub use gpu::{GraphicsContext, SoftwareContext, UploadStrategy, WgpuContext};
