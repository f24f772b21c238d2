//! Scratch-off reveal widget core.
//!
//! A mask image covers a background; pointer drags stamp a rotated brush that
//! erases the mask, coverage is sampled as a cleared percentage, and crossing
//! the threshold completes the reveal with a fade.
//!
//! - [`reveal`]: the [`ScratchReveal`] controller and its state machine
//! - [`draw`]: surfaces, brush stamping, coverage estimation and compositing
//! - [`assets`]: asynchronous image loading
//! - [`element`]: attribute-driven wrapper emitting [`RevealEvent`]s
//! - [`config`]: TOML configuration shared by the binaries

pub mod assets;
pub mod config;
pub mod draw;
pub mod element;
pub mod reveal;

pub use assets::{AssetError, AssetLoader, FsAssetLoader};
pub use config::Config;
pub use element::{RevealEvent, ScratchRevealElement, register_element};
pub use reveal::{PointerEvent, RevealError, RevealOptions, ScratchReveal};
