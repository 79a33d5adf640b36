//! Cycle instrumentation.
//!
//! On the flight processor this is the global timer register; here it is a
//! trait so tests and hosts can supply their own. Readings never influence
//! the estimate.

use std::time::Instant;

/// Monotonic tick source.
pub trait CycleCounter {
    /// Current tick count. May wrap.
    fn now(&self) -> u64;

    /// Nominal tick rate.
    fn ticks_per_second(&self) -> u64;

    /// Ticks elapsed since `start`, tolerating one wrap.
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now().wrapping_sub(start)
    }

    fn ticks_to_ms(&self, ticks: u64) -> f64 {
        ticks as f64 * 1000.0 / self.ticks_per_second() as f64
    }
}

/// Nanosecond ticks from [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct InstantCounter {
    origin: Instant,
}

impl InstantCounter {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for InstantCounter {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn ticks_per_second(&self) -> u64 {
        1_000_000_000
    }
}
