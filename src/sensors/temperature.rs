//! Temperature sensor with a two-phase conversion cycle.
//!
//! The appliance's sensor converts in the background: `start_conversion`
//! kicks it off and the next `read` returns that conversion's result.
//! The scheduler therefore always reads the value started on the
//! previous poll and immediately starts the next one.
//!
//! On the host the "analog front end" is a static `AtomicI32` that tests
//! and the simulation binary inject readings into.

use core::sync::atomic::{AtomicI32, Ordering};

use log::debug;

use crate::app::ports::SensorPort;

/// Reading reported before any value is injected (whole degrees).
pub const SIM_DEFAULT_READING: i32 = 72;

static SIM_TEMPERATURE: AtomicI32 = AtomicI32::new(SIM_DEFAULT_READING);

/// Set the value the next conversion will sample.
pub fn sim_set_temperature(degrees: i32) {
    SIM_TEMPERATURE.store(degrees, Ordering::Relaxed);
}

pub struct TemperatureSensor {
    /// Result of the last completed conversion.
    latched: i32,
    converting: bool,
    conversions: u32,
}

impl Default for TemperatureSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureSensor {
    pub fn new() -> Self {
        Self {
            latched: SIM_DEFAULT_READING,
            converting: false,
            conversions: 0,
        }
    }

    /// Conversions started since construction.
    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn sample() -> i32 {
        SIM_TEMPERATURE.load(Ordering::Relaxed)
    }
}

impl SensorPort for TemperatureSensor {
    fn start_conversion(&mut self) {
        self.latched = Self::sample();
        self.converting = true;
        self.conversions = self.conversions.saturating_add(1);
    }

    fn read(&mut self) -> i32 {
        if !self.converting {
            debug!("temperature: read without a conversion, returning last value");
        }
        self.converting = false;
        self.latched
    }
}
