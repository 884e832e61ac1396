//! Hardware adapter: bridges the appliance's peripherals to the port
//! traits the scheduler consumes.
//!
//! Owns the temperature sensor, watchdog, status LED and poll countdown
//! and exposes them through [`SensorPort`], [`WatchdogPort`],
//! [`IndicatorPort`] and [`PollTimer`].  This is the only module in the
//! system that touches the peripherals.

use crate::app::ports::{IndicatorPort, PollTimer, SensorPort, WatchdogPort};
use crate::drivers::countdown::Countdown;
use crate::drivers::status_led::StatusLed;
use crate::drivers::watchdog::Watchdog;
use crate::sensors::temperature::TemperatureSensor;

pub struct HardwareAdapter {
    sensor: TemperatureSensor,
    watchdog: Watchdog,
    led: StatusLed,
    poll: Countdown,
}

impl HardwareAdapter {
    pub fn new(sensor: TemperatureSensor, watchdog: Watchdog, led: StatusLed) -> Self {
        Self {
            sensor,
            watchdog,
            led,
            poll: Countdown::new(),
        }
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    pub fn led_mut(&mut self) -> &mut StatusLed {
        &mut self.led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn start_conversion(&mut self) {
        self.sensor.start_conversion();
    }

    fn read(&mut self) -> i32 {
        self.sensor.read()
    }
}

// ── WatchdogPort implementation ───────────────────────────────

impl WatchdogPort for HardwareAdapter {
    fn feed(&mut self) {
        self.watchdog.feed();
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn update(&mut self) {
        self.led.update();
    }
}

// ── PollTimer implementation ──────────────────────────────────

impl PollTimer for HardwareAdapter {
    fn arm(&mut self, ms: u32) {
        self.poll.arm(ms);
    }

    fn is_done(&self) -> bool {
        self.poll.is_done()
    }
}
