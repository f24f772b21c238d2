//! Configuration file support for scratch-reveal.
//!
//! Settings are read from `~/.config/scratch-reveal/config.toml`. If no file
//! exists, defaults are used.

pub mod types;


pub use types::{AssetsConfig, CompletionConfig, ProgressConfig, WidgetConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assets::AssetKind;
use crate::element::parse_brush_size;
use crate::reveal::{AssetSources, RevealError, RevealOptions};

const MAX_DIMENSION: u32 = 8192;
const MAX_FADE_MS: u64 = 10_000;
const MAX_PROGRESS_INTERVAL_MS: u64 = 5_000;

/// Root configuration deserialized from the TOML file.
///
/// # Example TOML
/// ```toml
/// [widget]
/// width = 300
/// height = 300
/// percent_to_finish = 60.0
/// brush_size = "10%"
///
/// [assets]
/// mask = "assets/scratch-reveal.png"
/// background = "assets/scratch-reveal-background.png"
/// brush = "assets/brush.png"
/// policy = "strict"
///
/// [progress]
/// interval_ms = 50
///
/// [completion]
/// fade_ms = 350
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub widget: WidgetConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub completion: CompletionConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `widget.width` / `widget.height`: 1 - 8192
    /// - `widget.percent_to_finish`: 0.0 - 100.0
    /// - `progress.interval_ms`: 0 - 5000
    /// - `completion.fade_ms`: 0 - 10000
    pub fn validate_and_clamp(&mut self) {
        if !(1..=MAX_DIMENSION).contains(&self.widget.width) {
            log::warn!(
                "Invalid width {}, clamping to 1-{} range",
                self.widget.width,
                MAX_DIMENSION
            );
            self.widget.width = self.widget.width.clamp(1, MAX_DIMENSION);
        }

        if !(1..=MAX_DIMENSION).contains(&self.widget.height) {
            log::warn!(
                "Invalid height {}, clamping to 1-{} range",
                self.widget.height,
                MAX_DIMENSION
            );
            self.widget.height = self.widget.height.clamp(1, MAX_DIMENSION);
        }

        if !self.widget.percent_to_finish.is_finite() {
            log::warn!(
                "Invalid percent_to_finish {}, falling back to default",
                self.widget.percent_to_finish
            );
            self.widget.percent_to_finish = WidgetConfig::default().percent_to_finish;
        } else if !(0.0..=100.0).contains(&self.widget.percent_to_finish) {
            log::warn!(
                "Invalid percent_to_finish {:.1}, clamping to 0.0-100.0 range",
                self.widget.percent_to_finish
            );
            self.widget.percent_to_finish = self.widget.percent_to_finish.clamp(0.0, 100.0);
        }

        if self.progress.interval_ms > MAX_PROGRESS_INTERVAL_MS {
            log::warn!(
                "Invalid progress interval_ms {}, clamping to 0-{} range",
                self.progress.interval_ms,
                MAX_PROGRESS_INTERVAL_MS
            );
            self.progress.interval_ms = MAX_PROGRESS_INTERVAL_MS;
        }

        if self.completion.fade_ms > MAX_FADE_MS {
            log::warn!(
                "Invalid fade_ms {}, clamping to 0-{} range",
                self.completion.fade_ms,
                MAX_FADE_MS
            );
            self.completion.fade_ms = MAX_FADE_MS;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("scratch-reveal");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads the user configuration, or defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates the configuration at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        config.validate_and_clamp();
        Ok(config)
    }

    /// Parses TOML without validation.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid config TOML")
    }

    /// Writes the configuration to the user config path, creating its directory.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Writes the documented example config to the user config path.
    ///
    /// # Errors
    /// Fails if a config file already exists there.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        Self::create_default_file_at(&config_path)?;
        Ok(config_path)
    }

    pub fn create_default_file_at(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                path.display()
            ));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, EXAMPLE_CONFIG)?;

        info!("Created default config at {}", path.display());
        Ok(())
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Builds controller options from this configuration.
    ///
    /// # Errors
    /// Returns [`RevealError::MissingSource`] when the policy is strict and an
    /// asset source is not configured.
    pub fn to_options(&self) -> Result<RevealOptions, RevealError> {
        let policy = self.assets.policy;
        let sources = AssetSources {
            mask: policy.resolve(AssetKind::Mask, self.assets.mask.as_deref())?,
            background: policy.resolve(AssetKind::Background, self.assets.background.as_deref())?,
            brush: policy.resolve(AssetKind::Brush, self.assets.brush.as_deref())?,
        };

        let (width, height) = (self.widget.width, self.widget.height);
        let brush_size = parse_brush_size(self.widget.brush_size.as_deref(), width, height, 0.0);

        let mut options = RevealOptions::new(width, height, sources)
            .brush_size(brush_size)
            .percent_to_finish(self.widget.percent_to_finish)
            .progress_interval(Duration::from_millis(self.progress.interval_ms))
            .fade_duration(Duration::from_millis(self.completion.fade_ms));
        options.enabled_percent_update = self.widget.enabled_percent_update;
        options.offset_per_event = self.widget.offset_per_event;
        Ok(options)
    }
}

/// Documented example configuration shipped with the crate.
pub const EXAMPLE_CONFIG: &str = include_str!("../../config.example.toml");
