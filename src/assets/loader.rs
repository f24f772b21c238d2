use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::assets::types::AssetError;
use crate::draw::Raster;

/// Abstraction over how decoded rasters are obtained for a source string.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, src: &str) -> Result<Raster, AssetError>;
}

/// Loads PNG assets from the local file system.
///
/// Relative paths are resolved against `base_dir` when one is set, otherwise
/// against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct FsAssetLoader {
    base_dir: Option<PathBuf>,
}

impl FsAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

#[async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load(&self, src: &str) -> Result<Raster, AssetError> {
        let mut path = resolve_source(src)?;
        if path.is_relative() {
            if let Some(base) = &self.base_dir {
                path = base.join(path);
            }
        }

        log::debug!("Loading asset {}", path.display());
        let bytes = tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(path.display().to_string())
            } else {
                AssetError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let raster = Raster::decode_png(&bytes)?;
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            raster.width(),
            raster.height()
        );
        Ok(raster)
    }
}

/// Maps an asset source string to a local path.
///
/// Accepts plain paths and `file://` URLs. Any other URL scheme is rejected;
/// single-letter schemes are treated as Windows drive letters.
pub fn resolve_source(src: &str) -> Result<PathBuf, AssetError> {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return Err(AssetError::NotFound(src.to_string()));
    }

    match Url::parse(trimmed) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| AssetError::NotFound(trimmed.to_string())),
        Ok(url) if url.scheme().len() > 1 => {
            Err(AssetError::UnsupportedScheme(url.scheme().to_string()))
        }
        _ => Ok(Path::new(trimmed).to_path_buf()),
    }
}
