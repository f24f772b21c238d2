//! Rendering primitives for the scratch layer (Cairo-based).
//!
//! This module defines the drawing types used by the reveal controller:
//! - [`Raster`]: decoded, immutable image data shared by every routine
//! - [`Surface`]: the abstract drawing surface, with [`CairoSurface`] as backend
//! - [`brush`]: stamping a rotated brush copy onto the surface
//! - [`coverage`]: estimating how much of the mask has been scratched away
//! - [`present`]: compositing background and scratch layer for display

pub mod brush;
pub mod cairo_surface;
pub mod coverage;
pub mod present;
pub mod raster;
pub mod surface;

// Re-export commonly used types at module level
pub use brush::{Brush, BrushSize, stamp};
pub use cairo_surface::CairoSurface;
pub use coverage::estimate_cleared_percent;
pub use present::render_scene;
pub use raster::Raster;
pub use surface::{CompositeMode, Surface, SurfaceError, Transform};
