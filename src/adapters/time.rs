//! Time adapters.
//!
//! - [`SystemClock`]: the host's real-time clock (stands in for the
//!   network-synchronised clock) plus monotonic uptime.
//! - [`ManualClock`]: a clock that only moves when told to, for tests
//!   and reproducible simulations.

use core::cell::Cell;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::app::ports::WallClock;
use crate::telemetry::Timestamp;

pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| Timestamp::try_from(d.as_secs()).unwrap_or(Timestamp::MAX))
    }
}

/// Wall clock under test control.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, t: Timestamp) {
        self.now.set(t);
    }

    pub fn advance(&self, secs: Timestamp) {
        self.now.set(self.now.get().saturating_add(secs));
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
