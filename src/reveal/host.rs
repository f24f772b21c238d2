//! Host capabilities the controller relies on (pointer capture, layout).

use thiserror::Error;

use super::events::PointerId;

/// On-screen rectangle of the surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Zone {
    pub left: f64,
    pub top: f64,
    /// Displayed width; 0 disables scaling
    pub width: f64,
    /// Displayed height; 0 disables scaling
    pub height: f64,
}

impl Zone {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Zone with an offset but no display size, so coordinates are not scaled.
    pub fn at(left: f64, top: f64) -> Self {
        Self::new(left, top, 0.0, 0.0)
    }

    /// Converts client coordinates to surface pixel coordinates.
    ///
    /// When the zone has a display size, the offset position is scaled by the
    /// ratio between surface pixels and displayed size.
    pub fn to_surface(
        &self,
        client_x: f64,
        client_y: f64,
        surface_width: u32,
        surface_height: u32,
    ) -> (f64, f64) {
        let mut x = client_x - self.left;
        let mut y = client_y - self.top;
        if self.width > 0.0 && self.height > 0.0 {
            x *= surface_width as f64 / self.width;
            y *= surface_height as f64 / self.height;
        }
        (x, y)
    }
}

/// Releasing pointer capture failed, typically because it was already lost.
#[derive(Debug, Error)]
#[error("Pointer {0} is not captured")]
pub struct PointerReleaseError(pub PointerId);

/// Element-side services used by the controller.
///
/// Mirrors what a canvas element provides: its bounding rectangle, pointer
/// capture, and whether it receives pointer input at all.
pub trait RevealHost {
    /// Current on-screen rectangle of the surface.
    fn bounding_rect(&self) -> Zone;

    fn capture_pointer(&mut self, pointer_id: PointerId);

    /// May fail harmlessly if capture was already released by the platform.
    fn release_pointer(&mut self, pointer_id: PointerId) -> Result<(), PointerReleaseError>;

    /// Enables or disables pointer delivery to the surface.
    fn set_interactive(&mut self, interactive: bool);

    /// Called once the background raster is ready to be shown behind the surface.
    fn attach_background(&mut self, _width: u32, _height: u32) {}
}

/// Host for surfaces that are not embedded anywhere: fixed zone, no capture.
#[derive(Debug, Clone, Default)]
pub struct DetachedHost {
    zone: Zone,
    captured: Option<PointerId>,
    interactive: bool,
}

impl DetachedHost {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            captured: None,
            interactive: true,
        }
    }

    pub fn captured(&self) -> Option<PointerId> {
        self.captured
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl RevealHost for DetachedHost {
    fn bounding_rect(&self) -> Zone {
        self.zone
    }

    fn capture_pointer(&mut self, pointer_id: PointerId) {
        self.captured = Some(pointer_id);
    }

    fn release_pointer(&mut self, pointer_id: PointerId) -> Result<(), PointerReleaseError> {
        match self.captured {
            Some(id) if id == pointer_id => {
                self.captured = None;
                Ok(())
            }
            _ => Err(PointerReleaseError(pointer_id)),
        }
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }
}
