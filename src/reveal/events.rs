//! Pointer event types delivered by the host.

use std::time::Instant;

/// Identifies one pointer (mouse, pen or touch contact).
pub type PointerId = u32;

/// A pointer sample in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub client_x: f64,
    pub client_y: f64,
    /// When the host observed the event
    pub time: Instant,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, client_x: f64, client_y: f64, time: Instant) -> Self {
        Self {
            pointer_id,
            client_x,
            client_y,
            time,
        }
    }
}
