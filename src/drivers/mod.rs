//! Peripheral drivers: watchdog, poll countdown and status LED.

pub mod countdown;
pub mod status_led;
pub mod watchdog;
