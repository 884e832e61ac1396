//! GET response body.
//!
//! Field order and nesting are part of the wire contract with existing
//! clients; serde emits struct fields in declaration order, so the order
//! of the fields below *is* the order on the wire.
//!
//! ```text
//! {"vpd":{"model":..,"manufacturer":..,"serial_number":..,
//!         "manufacture_date":"MM/DD/YYYY HH:MM:SS","mac_address":"AA:BB:..",
//!         "country_code":..},
//!  "tcrit_hi":N,"twarn_hi":N,"tcrit_lo":N,"twarn_lo":N,
//!  "temperature":N,"state":"NORMAL",
//!  "log":[{"timestamp":"MM/DD/YYYY HH:MM:SS","event":N},..]}
//! ```

use serde::{Serialize, Serializer};

use crate::app::ports::EventLogPort;
use crate::config::Thresholds;
use crate::telemetry::{DeviceDate, MacAddress, Vpd};

/// Status string reported by the appliance.
pub const DEVICE_STATE: &str = "NORMAL";

#[derive(Serialize)]
struct VpdView<'a> {
    model: &'a str,
    manufacturer: &'a str,
    serial_number: &'a str,
    manufacture_date: DeviceDate,
    mac_address: MacAddress,
    country_code: &'a str,
}

#[derive(Serialize)]
struct LogEntry {
    timestamp: DeviceDate,
    event: u8,
}

/// The event log, streamed in storage order straight from the log port.
struct LogView<'a>(&'a dyn EventLogPort);

impl Serialize for LogView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let log = self.0;
        serializer.collect_seq((0..log.len()).filter_map(|i| log.record(i)).map(|r| {
            LogEntry {
                timestamp: DeviceDate(r.timestamp),
                event: r.event.code(),
            }
        }))
    }
}

/// Snapshot of everything the GET body reports.
#[derive(Serialize)]
pub struct DeviceReport<'a> {
    vpd: VpdView<'a>,
    tcrit_hi: i32,
    twarn_hi: i32,
    tcrit_lo: i32,
    twarn_lo: i32,
    temperature: i32,
    state: &'static str,
    log: LogView<'a>,
}

impl<'a> DeviceReport<'a> {
    pub fn new(
        vpd: &'a Vpd,
        thresholds: Thresholds,
        temperature: i32,
        log: &'a dyn EventLogPort,
    ) -> Self {
        Self {
            vpd: VpdView {
                model: &vpd.model,
                manufacturer: &vpd.manufacturer,
                serial_number: &vpd.serial_number,
                manufacture_date: DeviceDate(vpd.manufacture_date),
                mac_address: MacAddress(vpd.mac_address),
                country_code: &vpd.country_code,
            },
            tcrit_hi: thresholds.hi_alarm,
            twarn_hi: thresholds.hi_warn,
            tcrit_lo: thresholds.lo_alarm,
            twarn_lo: thresholds.lo_warn,
            temperature,
            state: DEVICE_STATE,
            log: LogView(log),
        }
    }

    /// Serialize the whole body.  Nothing reaches the wire until this
    /// has succeeded.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
