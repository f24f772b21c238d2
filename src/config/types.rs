//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::reveal::SourcePolicy;
use crate::reveal::options::{
    DEFAULT_FADE_DURATION, DEFAULT_HEIGHT, DEFAULT_PERCENT_TO_FINISH, DEFAULT_WIDTH,
};

/// Surface and scratch behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WidgetConfig {
    /// Surface width in pixels (valid range: 1 - 8192)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Surface height in pixels (valid range: 1 - 8192)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Cleared percentage that completes the reveal (valid range: 0 - 100)
    #[serde(default = "default_percent_to_finish")]
    pub percent_to_finish: f64,

    /// Brush width: `"24"`, `"24px"` or `"10%"` of the smaller surface side.
    /// Unset keeps the brush image's natural size.
    #[serde(default)]
    pub brush_size: Option<String>,

    /// Sample coverage and report progress while scratching
    #[serde(default = "default_enabled_percent_update")]
    pub enabled_percent_update: bool,

    /// Re-read the surface position on every pointer event
    #[serde(default)]
    pub offset_per_event: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            percent_to_finish: default_percent_to_finish(),
            brush_size: None,
            enabled_percent_update: default_enabled_percent_update(),
            offset_per_event: false,
        }
    }
}

/// Image sources for the mask, background and brush.
///
/// Sources are file paths or `file://` URLs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct AssetsConfig {
    #[serde(default)]
    pub mask: Option<String>,

    #[serde(default)]
    pub background: Option<String>,

    #[serde(default)]
    pub brush: Option<String>,

    /// `strict` rejects missing sources, `lenient` substitutes the built-in assets
    #[serde(default)]
    pub policy: SourcePolicy,
}

/// Progress reporting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProgressConfig {
    /// Minimum milliseconds between progress reports while dragging
    /// (valid range: 0 - 5000; 0 reports every frame)
    #[serde(default)]
    pub interval_ms: u64,
}

/// Completion transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompletionConfig {
    /// Fade-out duration of the scratch layer in milliseconds (valid range: 0 - 10000)
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            fade_ms: default_fade_ms(),
        }
    }
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_percent_to_finish() -> f64 {
    DEFAULT_PERCENT_TO_FINISH
}

fn default_enabled_percent_update() -> bool {
    true
}

fn default_fade_ms() -> u64 {
    DEFAULT_FADE_DURATION.as_millis() as u64
}
