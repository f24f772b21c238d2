use thiserror::Error;

use crate::assets::{AssetError, AssetKind};
use crate::draw::SurfaceError;

/// Errors surfaced by the reveal controller.
///
/// Invalid runtime input (bad brush sizes, degenerate resizes) is never an
/// error; those calls are ignored.
#[derive(Debug, Error)]
pub enum RevealError {
    #[error("Missing required {0} source")]
    MissingSource(AssetKind),

    #[error("Invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid completion threshold {0}")]
    InvalidThreshold(f64),

    #[error("Invalid brush size {0}")]
    InvalidBrushSize(f64),

    #[error("Failed to load {kind} image '{src}': {source}")]
    AssetLoad {
        kind: AssetKind,
        src: String,
        #[source]
        source: AssetError,
    },

    #[error("Drawing surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Controller was already initialized")]
    AlreadyInitialized,
}
