//! System configuration parameters
//!
//! All tunable parameters for the TempMon appliance.
//! Alarm thresholds are persisted through the storage port; the rest
//! can be overridden by a JSON file handed to the host binary.

use serde::{Deserialize, Serialize};

/// The four alarm thresholds, in whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Critical-high alarm (`tcrit_hi`).
    pub hi_alarm: i32,
    /// High warning (`twarn_hi`).
    pub hi_warn: i32,
    /// Critical-low alarm (`tcrit_lo`).
    pub lo_alarm: i32,
    /// Low warning (`twarn_lo`).
    pub lo_warn: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            hi_alarm: 100,
            hi_warn: 90,
            lo_alarm: 40,
            lo_warn: 50,
        }
    }
}

impl Thresholds {
    /// Check the ordering `hi_alarm > hi_warn > lo_warn > lo_alarm`.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.hi_alarm <= self.hi_warn {
            return Err("hi_alarm must be above hi_warn");
        }
        if self.hi_warn <= self.lo_warn {
            return Err("hi_warn must be above lo_warn");
        }
        if self.lo_warn <= self.lo_alarm {
            return Err("lo_warn must be above lo_alarm");
        }
        Ok(())
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Network ---
    /// TCP port of the single-connection API listener
    pub http_port: u16,

    // --- Timing ---
    /// Delay before the first sensor poll after boot (milliseconds).
    /// Lets the start-up temperature spike settle before alarms are armed.
    pub startup_settle_ms: u32,
    /// Sensor poll interval once running (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
    /// Sleep between idle scheduler iterations on the host (milliseconds)
    pub idle_pause_ms: u32,

    // --- Sensor ---
    /// Temperature reported until the first poll completes (whole degrees)
    pub initial_reading: i32,

    // --- Alarms ---
    /// Factory thresholds used when storage holds none
    pub thresholds: Thresholds,
    /// Degrees a reading must retreat past a threshold before an alarm clears
    pub alarm_hysteresis: i32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            http_port: 8080,

            // Timing
            startup_settle_ms: 5000,
            sensor_poll_interval_ms: 1000,
            watchdog_timeout_ms: 2000,
            idle_pause_ms: 5,

            // Sensor
            initial_reading: 75,

            // Alarms
            thresholds: Thresholds::default(),
            alarm_hysteresis: 1,
        }
    }
}
