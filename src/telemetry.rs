//! Read-only telemetry model: device identity, event log records and the
//! textual renderings the API uses for dates and hardware addresses.
//!
//! Identity data lives in the vital-product-data (VPD) block written at
//! manufacture time.  Nothing in the control core mutates it.

use core::fmt;

use chrono::{DateTime, Datelike, Timelike};
use serde::{Deserialize, Serialize, Serializer};

/// Seconds since the Unix epoch, as kept by the event log and VPD.
pub type Timestamp = u32;

/// Six-byte Ethernet hardware address.
pub type MacBytes = [u8; 6];

// ---------------------------------------------------------------------------
// Vital product data
// ---------------------------------------------------------------------------

/// Device identity block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpd {
    pub model: heapless::String<16>,
    pub manufacturer: heapless::String<16>,
    pub serial_number: heapless::String<16>,
    /// Manufacture date (Unix seconds).
    pub manufacture_date: Timestamp,
    pub mac_address: MacBytes,
    /// ISO 3166 alpha-3 country of origin.
    pub country_code: heapless::String<4>,
}

impl Vpd {
    /// Build a VPD block, truncating any field that exceeds its slot.
    pub fn new(
        model: &str,
        manufacturer: &str,
        serial_number: &str,
        manufacture_date: Timestamp,
        mac_address: MacBytes,
        country_code: &str,
    ) -> Self {
        Self {
            model: bounded(model),
            manufacturer: bounded(manufacturer),
            serial_number: bounded(serial_number),
            manufacture_date,
            mac_address,
            country_code: bounded(country_code),
        }
    }
}

impl Default for Vpd {
    fn default() -> Self {
        Self::new(
            "TM-100",
            "TempMon",
            "TM0000001",
            1_575_590_400, // 2019-12-06
            [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE],
            "USA",
        )
    }
}

fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Kinds of event the appliance records.  The discriminant is the
/// integer code reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// Clock about to be set from the network.
    TimeSet = 1,
    /// Clock synchronised with network time.
    NewTime = 2,
    /// Appliance finished booting.
    Startup = 3,
    /// Reading reached the critical-high threshold.
    HiAlarm = 4,
    /// Reading reached the high-warning threshold.
    HiWarn = 5,
    /// Reading reached the critical-low threshold.
    LoAlarm = 6,
    /// Reading reached the low-warning threshold.
    LoWarn = 7,
}

impl EventKind {
    /// Integer code as rendered in the API.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored event code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::TimeSet),
            2 => Some(Self::NewTime),
            3 => Some(Self::Startup),
            4 => Some(Self::HiAlarm),
            5 => Some(Self::HiWarn),
            6 => Some(Self::LoAlarm),
            7 => Some(Self::LoWarn),
            _ => None,
        }
    }
}

/// One event log entry, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: Timestamp,
    pub event: EventKind,
}

// ---------------------------------------------------------------------------
// Renderings
// ---------------------------------------------------------------------------

/// A [`Timestamp`] rendered as `MM/DD/YYYY HH:MM:SS` (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDate(pub Timestamp);

impl fmt::Display for DeviceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(i64::from(self.0), 0) {
            Some(dt) => write!(
                f,
                "{:02}/{:02}/{:04} {:02}:{:02}:{:02}",
                dt.month(),
                dt.day(),
                dt.year(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            None => f.write_str("00/00/0000 00:00:00"),
        }
    }
}

impl Serialize for DeviceDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A hardware address rendered as colon-separated upper-case hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub MacBytes);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
