//! Asset loading for the reveal widget.
//!
//! Assets (mask, background and brush) are fetched and decoded exactly once
//! per initialization through the [`AssetLoader`] seam. The default loader
//! reads PNG files from local paths or `file://` URLs.

mod loader;
pub mod types;


pub use loader::{AssetLoader, FsAssetLoader, resolve_source};
pub use types::{AssetError, AssetKind};
