//! Timed fade played once the reveal completes.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FadeState {
    #[default]
    Idle,
    Running {
        started_at: Instant,
    },
    Finished,
}

/// Fade-out of the scratch layer. Starts at most once.
#[derive(Debug, Clone)]
pub struct FadeTransition {
    duration: Duration,
    state: FadeState,
}

impl FadeTransition {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: FadeState::Idle,
        }
    }

    /// Starts the fade; returns false if it was already started.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.state != FadeState::Idle {
            return false;
        }
        self.state = FadeState::Running { started_at: now };
        true
    }

    /// Layer opacity at `now`: 1 before the fade, falling linearly to 0.
    pub fn opacity(&self, now: Instant) -> f64 {
        match self.state {
            FadeState::Idle => 1.0,
            FadeState::Finished => 0.0,
            FadeState::Running { started_at } => {
                if self.duration.is_zero() {
                    return 0.0;
                }
                let elapsed = now.saturating_duration_since(started_at);
                let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
                (1.0 - t).clamp(0.0, 1.0)
            }
        }
    }

    /// Moves a running fade to finished once its duration has elapsed.
    ///
    /// Returns true exactly once, on the call that finishes the fade.
    pub fn advance(&mut self, now: Instant) -> bool {
        if let FadeState::Running { started_at } = self.state {
            if now.saturating_duration_since(started_at) >= self.duration {
                self.state = FadeState::Finished;
                return true;
            }
        }
        false
    }
}
