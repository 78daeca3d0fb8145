//! Simulated time.

use std::time::{Duration, Instant};

/// Manually advanced clock handed to the sans-IO state machines.
///
/// Nothing in the workspace reads the ambient clock; tests own time
/// completely, which makes flush deadlines and probe intervals exact.
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    now: Instant,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    /// A clock anchored at an arbitrary origin.
    pub fn new() -> Self {
        Self { now: Instant::now() }
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move time forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}
