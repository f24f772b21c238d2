//! Data types for asset loading.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the three widget rasters an asset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Erasable foreground drawn over the whole surface.
    Mask,
    /// Image revealed behind the mask.
    Background,
    /// Stamp shape used for erasing.
    Brush,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Mask => "mask",
            AssetKind::Background => "background",
            AssetKind::Brush => "brush",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while fetching or decoding an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Unsupported asset URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Asset not found: {0}")]
    NotFound(String),
}
