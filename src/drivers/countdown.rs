//! One-shot countdown timer.
//!
//! Paces the sensor poll.  `arm` starts a countdown; `is_done` stays
//! `true` from expiry until the next `arm`.  A countdown that was never
//! armed is not done.

use std::time::{Duration, Instant};

use crate::app::ports::PollTimer;

#[derive(Debug, Default)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Time left before expiry; zero once done, `None` when unarmed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl PollTimer for Countdown {
    fn arm(&mut self, ms: u32) {
        self.deadline = Some(Instant::now() + Duration::from_millis(u64::from(ms)));
    }

    fn is_done(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
