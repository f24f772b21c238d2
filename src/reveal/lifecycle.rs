//! Controller phases and cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, `init` not yet called
    Uninitialized,
    /// Waiting for assets
    Loading,
    /// Mask drawn, pointer input accepted
    Ready,
    /// Completion threshold crossed; terminal
    Done,
    /// Asset loading failed; the controller stays inert
    Failed,
}

/// Cloneable handle that marks a controller destroyed.
///
/// Lets the owner cancel a controller whose `init` future is still pending;
/// the controller checks the flag when loads resolve and abandons its work.
#[derive(Debug, Clone, Default)]
pub struct DestroyHandle {
    destroyed: Arc<AtomicBool>,
}

impl DestroyHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}
