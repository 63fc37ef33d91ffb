//! Error types for the glyph atlas.
//!
//! Only two classes of failure reach callers: configuration errors (fatal for
//! the font cache instance) and GPU resource errors (the call failed, but the
//! cache is unchanged and may be retried). Missing glyphs and full pages are
//! handled internally and never show up here.

use thiserror::Error;

/// Fatal setup error. A font cache that reports one of these must not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("rasterizer handle is not valid")]
    InvalidRasterizer,

    #[error("font metrics are not positive (ascender {ascender}, line spacing {line_spacing})")]
    NonPositiveMetrics { ascender: f32, line_spacing: f32 },

    #[error("tile size {width}x{height} is not positive")]
    InvalidTileSize { width: u32, height: u32 },

    #[error(
        "atlas page {page_width}x{page_height} cannot hold a single {tile_width}x{tile_height} tile"
    )]
    PageTooSmall {
        page_width: u32,
        page_height: u32,
        tile_width: u32,
        tile_height: u32,
    },

    #[error("page limit must allow at least one page")]
    ZeroPageLimit,
}

/// GPU resource failure. Recoverable: nothing was committed to the cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpuError {
    #[error("atlas page limit of {max} reached")]
    PageLimit { max: usize },

    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[error("texture creation failed: {0}")]
    TextureCreation(String),

    #[error("upload to page {page} failed: {reason}")]
    Upload { page: u32, reason: String },

    #[error("no graphics device available: {0}")]
    DeviceUnavailable(String),
}

/// Error returned by the font cache facade.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// The cache was released; further glyph requests are a programming error.
    #[error("font cache used after release")]
    Released,
}

impl AtlasError {
    /// Whether retrying the same call later can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Gpu(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gpu_errors_are_recoverable() {
        assert!(AtlasError::from(GpuError::PageLimit { max: 4 }).is_recoverable());
        assert!(!AtlasError::from(ConfigError::InvalidRasterizer).is_recoverable());
        assert!(!AtlasError::Released.is_recoverable());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = AtlasError::from(ConfigError::PageTooSmall {
            page_width: 8,
            page_height: 8,
            tile_width: 16,
            tile_height: 16,
        });
        assert_eq!(
            err.to_string(),
            "atlas page 8x8 cannot hold a single 16x16 tile"
        );
        let err = GpuError::Upload {
            page: 2,
            reason: "context lost".to_owned(),
        };
        assert_eq!(err.to_string(), "upload to page 2 failed: context lost");
    }
}
