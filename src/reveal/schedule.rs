//! Rate limiting for pointer moves and progress emission.

use std::time::{Duration, Instant};

/// Coalesces bursts of values into at most one per frame.
///
/// Each [`FrameThrottle::schedule`] replaces the pending value, so the frame
/// always sees the most recent one.
#[derive(Debug)]
pub struct FrameThrottle<T> {
    pending: Option<T>,
}

impl<T> Default for FrameThrottle<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameThrottle<T> {
    pub fn schedule(&mut self, value: T) {
        self.pending = Some(value);
    }

    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Time-based throttle for progress callbacks. A zero interval never throttles.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Whether an emission at `now` is allowed.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) if !self.interval.is_zero() => {
                now.saturating_duration_since(last) >= self.interval
            }
            _ => true,
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_emit = Some(now);
    }
}
