//! Host whose bounding rectangle follows the element's observed size.

use std::cell::Cell;
use std::rc::Rc;

use crate::reveal::{PointerId, PointerReleaseError, RevealHost, Zone};

/// [`RevealHost`] reading its rectangle from a cell shared with the element.
///
/// The surface fills the element, so the element updates the rectangle on
/// every observed resize and the controller picks it up on its next refresh.
#[derive(Debug, Clone)]
pub struct ElementHost {
    bounds: Rc<Cell<Zone>>,
    captured: Option<PointerId>,
}

impl ElementHost {
    pub fn new(bounds: Rc<Cell<Zone>>) -> Self {
        Self {
            bounds,
            captured: None,
        }
    }
}

impl RevealHost for ElementHost {
    fn bounding_rect(&self) -> Zone {
        self.bounds.get()
    }

    fn capture_pointer(&mut self, pointer_id: PointerId) {
        self.captured = Some(pointer_id);
    }

    fn release_pointer(&mut self, pointer_id: PointerId) -> Result<(), PointerReleaseError> {
        if self.captured != Some(pointer_id) {
            return Err(PointerReleaseError(pointer_id));
        }
        self.captured = None;
        Ok(())
    }

    // The controller stops accepting input itself; nothing to toggle here.
    fn set_interactive(&mut self, _interactive: bool) {}
}
