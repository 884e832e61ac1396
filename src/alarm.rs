//! Temperature alarm classification with hysteresis.
//!
//! The reading is placed in one of five bands relative to the configured
//! thresholds.  A reading at or beyond a threshold enters that band at
//! once; leaving a band requires the reading to retreat `hysteresis`
//! degrees past the threshold, so a reading hovering on a threshold does
//! not flap.
//!
//! ```text
//!   LoAlarm │ LoWarn │      Normal      │ HiWarn │ HiAlarm
//!       lo_alarm  lo_warn            hi_warn   hi_alarm
//! ```
//!
//! Escalations (a more severe band, or a jump to the other side) raise
//! the band's event.  Every raised or announced event is "sent" to the
//! supervising controller, which on the host means a log line.

use log::{info, warn};

use crate::app::ports::AlarmPort;
use crate::config::Thresholds;
use crate::telemetry::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmLevel {
    LoAlarm,
    LoWarn,
    Normal,
    HiWarn,
    HiAlarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Low,
    None,
    High,
}

impl AlarmLevel {
    /// Band of `reading` without hysteresis.
    pub fn classify(reading: i32, t: &Thresholds) -> Self {
        if reading >= t.hi_alarm {
            Self::HiAlarm
        } else if reading >= t.hi_warn {
            Self::HiWarn
        } else if reading <= t.lo_alarm {
            Self::LoAlarm
        } else if reading <= t.lo_warn {
            Self::LoWarn
        } else {
            Self::Normal
        }
    }

    fn severity(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::HiWarn | Self::LoWarn => 1,
            Self::HiAlarm | Self::LoAlarm => 2,
        }
    }

    fn side(self) -> Side {
        match self {
            Self::LoAlarm | Self::LoWarn => Side::Low,
            Self::Normal => Side::None,
            Self::HiWarn | Self::HiAlarm => Side::High,
        }
    }

    /// Event logged when this band is entered.
    pub fn event(self) -> Option<EventKind> {
        match self {
            Self::LoAlarm => Some(EventKind::LoAlarm),
            Self::LoWarn => Some(EventKind::LoWarn),
            Self::Normal => None,
            Self::HiWarn => Some(EventKind::HiWarn),
            Self::HiAlarm => Some(EventKind::HiAlarm),
        }
    }
}

pub struct AlarmMonitor {
    level: AlarmLevel,
    hysteresis: i32,
    sent: u32,
    last_sent: Option<EventKind>,
}

impl AlarmMonitor {
    pub fn new(hysteresis: i32) -> Self {
        Self {
            level: AlarmLevel::Normal,
            hysteresis: hysteresis.max(0),
            sent: 0,
            last_sent: None,
        }
    }

    pub fn level(&self) -> AlarmLevel {
        self.level
    }

    /// Notifications sent so far (raised alarms plus announcements).
    pub fn sent_count(&self) -> u32 {
        self.sent
    }

    pub fn last_sent(&self) -> Option<EventKind> {
        self.last_sent
    }

    fn next_level(&self, reading: i32, t: &Thresholds) -> AlarmLevel {
        let raw = AlarmLevel::classify(reading, t);
        if raw == self.level
            || raw.severity() > self.level.severity()
            || (raw.side() != self.level.side() && raw.side() != Side::None)
        {
            return raw;
        }

        // Easing off: the reading must clear the threshold by the
        // hysteresis margin before the band is left.
        let biased = match self.level.side() {
            Side::High => reading.saturating_add(self.hysteresis),
            Side::Low => reading.saturating_sub(self.hysteresis),
            Side::None => reading,
        };
        AlarmLevel::classify(biased, t)
    }

    fn send(&mut self, event: EventKind) {
        self.sent = self.sent.saturating_add(1);
        self.last_sent = Some(event);
    }
}

impl AlarmPort for AlarmMonitor {
    fn update(&mut self, reading: i32, thresholds: &Thresholds) -> Option<EventKind> {
        let next = self.next_level(reading, thresholds);
        if next == self.level {
            return None;
        }

        let escalated =
            next.severity() > self.level.severity() || next.side() != self.level.side();
        let prev = self.level;
        self.level = next;

        if next == AlarmLevel::Normal {
            info!("alarm: {:?} cleared at {}", prev, reading);
            return None;
        }
        if !escalated {
            info!("alarm: eased from {:?} to {:?} at {}", prev, next, reading);
            return None;
        }

        let event = next.event()?;
        warn!("alarm: {:?} raised at {} (event {})", next, reading, event.code());
        self.send(event);
        Some(event)
    }

    fn announce(&mut self, event: EventKind) {
        info!("alarm: sending {:?} (event {})", event, event.code());
        self.send(event);
    }
}
