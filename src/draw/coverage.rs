//! Scratch coverage estimation.

use super::{Surface, SurfaceError};

/// Percentage (0-100, unrounded) of pixels whose alpha is exactly zero.
///
/// Partially transparent pixels, such as anti-aliased stamp edges, do not
/// count as cleared. An empty buffer reports 0.
pub fn cleared_percent(alpha: &[u8]) -> f64 {
    if alpha.is_empty() {
        return 0.0;
    }
    let cleared = alpha.iter().filter(|a| **a == 0).count();
    (cleared as f64 / alpha.len() as f64) * 100.0
}

/// Samples every pixel of `surface` and returns the cleared percentage.
///
/// Costs O(width * height); callers throttle it to once per frame.
pub fn estimate_cleared_percent<S: Surface>(surface: &S) -> Result<f64, SurfaceError> {
    let alpha = surface.alpha_channel()?;
    Ok(cleared_percent(&alpha))
}
