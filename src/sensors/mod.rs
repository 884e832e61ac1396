//! Sensor drivers.
//!
//! Only the temperature sensor feeds the scheduler; it is wrapped by the
//! [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter).

pub mod temperature;
