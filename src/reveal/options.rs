//! Construction options for the reveal controller.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::RevealError;
use crate::assets::AssetKind;

/// Built-in asset paths used by lenient configurations.
pub const DEFAULT_BRUSH_SRC: &str = "assets/brush.png";
pub const DEFAULT_MASK_SRC: &str = "assets/scratch-reveal.png";
pub const DEFAULT_BACKGROUND_SRC: &str = "assets/scratch-reveal-background.png";

pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_PERCENT_TO_FINISH: f64 = 60.0;
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(350);

/// What to do when an asset source is not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourcePolicy {
    /// Missing sources are configuration errors
    #[default]
    Strict,
    /// Missing sources fall back to the built-in demo assets
    Lenient,
}

impl SourcePolicy {
    /// Resolves a possibly missing source for `kind`.
    ///
    /// Blank strings count as missing.
    pub fn resolve(self, kind: AssetKind, src: Option<&str>) -> Result<String, RevealError> {
        match src.map(str::trim).filter(|src| !src.is_empty()) {
            Some(src) => Ok(src.to_string()),
            None => match self {
                SourcePolicy::Strict => Err(RevealError::MissingSource(kind)),
                SourcePolicy::Lenient => Ok(default_source(kind).to_string()),
            },
        }
    }
}

/// Built-in asset path for `kind`.
pub fn default_source(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Mask => DEFAULT_MASK_SRC,
        AssetKind::Background => DEFAULT_BACKGROUND_SRC,
        AssetKind::Brush => DEFAULT_BRUSH_SRC,
    }
}

/// Sources for the three rasters. All are required.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetSources {
    pub mask: String,
    pub background: String,
    pub brush: String,
}

impl AssetSources {
    pub fn new(
        mask: impl Into<String>,
        background: impl Into<String>,
        brush: impl Into<String>,
    ) -> Self {
        Self {
            mask: mask.into(),
            background: background.into(),
            brush: brush.into(),
        }
    }

    /// The built-in demo assets.
    pub fn defaults() -> Self {
        Self::new(DEFAULT_MASK_SRC, DEFAULT_BACKGROUND_SRC, DEFAULT_BRUSH_SRC)
    }
}

/// Configuration consumed by [`ScratchReveal`](super::ScratchReveal).
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOptions {
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
    pub sources: AssetSources,
    /// Brush width in surface pixels; 0 keeps the brush image's natural size
    pub brush_size: f64,
    /// Completion threshold in percent, compared with strict greater-than
    pub percent_to_finish: f64,
    /// When false, coverage is never sampled and completion never fires
    pub enabled_percent_update: bool,
    /// Re-read the host rectangle on every pointer event instead of caching it
    pub offset_per_event: bool,
    /// Minimum spacing between progress emissions from move samples
    pub progress_interval: Duration,
    /// Length of the fade played on completion
    pub fade_duration: Duration,
}

impl RevealOptions {
    pub fn new(width: u32, height: u32, sources: AssetSources) -> Self {
        Self {
            width,
            height,
            sources,
            ..Self::default()
        }
    }

    pub fn brush_size(mut self, size: f64) -> Self {
        self.brush_size = size;
        self
    }

    pub fn percent_to_finish(mut self, percent: f64) -> Self {
        self.percent_to_finish = percent;
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn fade_duration(mut self, duration: Duration) -> Self {
        self.fade_duration = duration;
        self
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            sources: AssetSources::default(),
            brush_size: 0.0,
            percent_to_finish: DEFAULT_PERCENT_TO_FINISH,
            enabled_percent_update: true,
            offset_per_event: false,
            progress_interval: Duration::ZERO,
            fade_duration: DEFAULT_FADE_DURATION,
        }
    }
}
