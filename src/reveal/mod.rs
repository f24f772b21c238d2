//! Reveal controller and its state machine.
//!
//! This module turns host pointer events into scratches on the mask surface:
//! - [`ScratchReveal`]: owns the surface and rasters, stamps, samples progress
//!   and runs the completion transition
//! - [`RevealHost`]: layout and pointer-capture services of the embedding element
//! - [`FrameThrottle`] / [`ProgressThrottle`]: per-frame move coalescing and
//!   progress rate limiting
//! - [`DestroyHandle`]: cancellation that also reaches a pending `init`

mod controller;
pub mod error;
pub mod events;
pub mod fade;
pub mod host;
pub mod lifecycle;
pub mod options;
pub mod schedule;

#[cfg(test)]
mod tests;

pub use controller::ScratchReveal;
pub use error::RevealError;
pub use events::{PointerEvent, PointerId};
pub use fade::FadeTransition;
pub use host::{DetachedHost, PointerReleaseError, RevealHost, Zone};
pub use lifecycle::{DestroyHandle, Phase};
pub use options::{AssetSources, RevealOptions, SourcePolicy};
pub use schedule::{FrameThrottle, ProgressThrottle};
