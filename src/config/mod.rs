//! Atlas configuration and TOML loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlas::TileAllocator;
use crate::error::ConfigError;
use crate::gpu::UploadStrategy;

/// Page geometry, growth bound, and upload strategy for one font cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub page_width: u32,
    pub page_height: u32,
    /// Upper bound on pages per font cache. Running into it is reported as
    /// a GPU resource failure.
    pub max_pages: usize,
    pub strategy: UploadStrategy,
    /// Fixed `[width, height]` tile size. Derived from the font's line
    /// spacing when unset.
    pub tile_size: Option<[u32; 2]>,
    /// Rasterize printable ASCII during `init`.
    pub precache_ascii: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_width: 1024,
            page_height: 1024,
            max_pages: 16,
            strategy: UploadStrategy::Direct,
            tile_size: None,
            precache_ascii: false,
        }
    }
}

impl AtlasConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or malformed.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("config: failed to read {}: {e}", path.display());
                }
                return Self::default();
            }
        };

        match Self::from_toml_str(&data) {
            Ok(cfg) => {
                log::debug!("config: loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("config: parse error in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Like [`load`](Self::load), but reports a missing or malformed file
    /// instead of substituting defaults.
    pub fn try_load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::from_toml_str(&data).map_err(|e| format!("parse error in {}: {e}", path.display()))
    }

    /// Check that pages can hold a `tile` (`(width, height)`) and that at
    /// least one page may be created.
    pub fn validate(&self, tile: (u32, u32)) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroPageLimit);
        }
        TileAllocator::new(tile.0, tile.1, self.page_width, self.page_height).map(|_| ())
    }
}
