//! Watchdog timer driver.
//!
//! On the appliance the watchdog resets the device when the main loop
//! stalls past its deadline.  The host build cannot reset anything, so it
//! reports a late feed instead: a `warn!` naming how far past the
//! deadline the loop ran.
//!
//! The scheduler must call `feed()` on every iteration.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::app::ports::WatchdogPort;

pub struct Watchdog {
    timeout: Duration,
    last_feed: Instant,
    feeds: u64,
    missed: u32,
}

impl Watchdog {
    /// Arm the watchdog with a `timeout_ms` deadline.
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): armed ({} ms timeout)", timeout_ms);
        Self {
            timeout: Duration::from_millis(u64::from(timeout_ms)),
            last_feed: Instant::now(),
            feeds: 0,
            missed: 0,
        }
    }

    /// The deadline has passed since the last feed.
    pub fn is_expired(&self) -> bool {
        self.last_feed.elapsed() > self.timeout
    }

    /// Total feeds since construction.
    pub fn feed_count(&self) -> u64 {
        self.feeds
    }

    /// Feeds that arrived after the deadline (each one a device reset on
    /// real hardware).
    pub fn missed_deadlines(&self) -> u32 {
        self.missed
    }
}

impl WatchdogPort for Watchdog {
    fn feed(&mut self) {
        let since = self.last_feed.elapsed();
        if since > self.timeout {
            self.missed = self.missed.saturating_add(1);
            warn!(
                "Watchdog(sim): fed {} ms after the {} ms deadline",
                (since - self.timeout).as_millis(),
                self.timeout.as_millis()
            );
        }
        self.last_feed = Instant::now();
        self.feeds += 1;
    }
}
