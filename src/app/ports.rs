//! Port traits: the hexagonal boundary between the control core and the
//! appliance's collaborators.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Monitor (cyclic scheduler)
//! ```
//!
//! Driven adapters (socket, sensor, EEPROM, watchdog, indicator) implement
//! these traits.  The [`Monitor`](super::service::Monitor) consumes them
//! via generics, so the control core never touches hardware directly.
//!
//! Every port is used from the single scheduler thread only; none of
//! them needs interior synchronisation.

use crate::config::Thresholds;
use crate::error::ChannelError;
use crate::telemetry::{EventKind, LogRecord, Timestamp};

// ───────────────────────────────────────────────────────────────
// Connection channel (driven adapter: TCP stack ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Lifecycle of the single server socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketStatus {
    /// No socket open; the scheduler must reopen it in listening mode.
    Closed,
    /// Waiting for a client.
    Listening,
    /// A client is connected.
    Established,
    /// Transitional or unrecognised socket state.
    Other,
}

/// Line-buffered, non-blocking view of the one accepted connection.
///
/// Line queries look only at input already received; none of them
/// blocks on the network.
///
/// # Progress guarantee
///
/// Whenever [`line_available`](Self::line_available) is `true`,
/// [`flush_line`](Self::flush_line) must consume exactly that line.  A
/// line longer than the adapter's buffer is surfaced as a complete
/// (truncated) line so it can always be flushed.
pub trait LineChannel {
    /// Current socket lifecycle state.
    fn status(&self) -> SocketStatus;

    /// Open the socket on `port` in passive (listening) mode.
    fn open_listening(&mut self, port: u16) -> Result<(), ChannelError>;

    /// Close the connection.  Unread input is discarded.
    fn disconnect(&mut self);

    /// At least one complete line has been received.
    fn line_available(&mut self) -> bool;

    /// The current line begins with `prefix` (exact, case-sensitive).
    fn line_starts_with(&self, prefix: &[u8]) -> bool;

    /// The current line is empty (the header/body separator).
    fn is_blank_line(&self) -> bool;

    /// Discard the current line.  No-op when no complete line exists.
    fn flush_line(&mut self);

    /// Bytes received but not yet consumed, complete lines or not.
    fn bytes_pending(&self) -> usize;

    /// Queue `data` for transmission.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), ChannelError>;

    /// Queue a string for transmission.
    fn write_str(&mut self, s: &str) -> Result<(), ChannelError> {
        self.write_bytes(s.as_bytes())
    }

    /// Queue a single character for transmission.
    fn write_char(&mut self, c: char) -> Result<(), ChannelError> {
        let mut buf = [0u8; 4];
        self.write_bytes(c.encode_utf8(&mut buf).as_bytes())
    }
}

// ───────────────────────────────────────────────────────────────
// Hardware ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature sensor with a separate start-conversion step.
pub trait SensorPort {
    /// Kick off the next conversion; the result is collected by `read`.
    fn start_conversion(&mut self);

    /// Latest converted reading in whole degrees.
    fn read(&mut self) -> i32;
}

/// Watchdog timer.  Must be fed once per scheduler iteration.
pub trait WatchdogPort {
    fn feed(&mut self);
}

/// Time-sliced status indicator (blinking LED).
pub trait IndicatorPort {
    /// Advance the indicator pattern; cheap, never blocks.
    fn update(&mut self);
}

/// One-shot countdown used to pace sensor polling.
pub trait PollTimer {
    /// Start (or restart) the countdown.
    fn arm(&mut self, ms: u32);

    /// The armed countdown has elapsed.
    fn is_done(&self) -> bool;
}

/// Network-synchronised wall clock.
pub trait WallClock {
    /// Current time in Unix seconds.
    fn now(&self) -> Timestamp;
}

// ───────────────────────────────────────────────────────────────
// Alarm port (driven adapter: domain → alarm classification)
// ───────────────────────────────────────────────────────────────

/// Hysteresis-aware alarm classification.
pub trait AlarmPort {
    /// Feed the latest reading.  Returns the alarm raised by this reading,
    /// if it escalated the alarm state.
    fn update(&mut self, reading: i32, thresholds: &Thresholds) -> Option<EventKind>;

    /// Send an unconditional notification (e.g. start-up).
    fn announce(&mut self, event: EventKind);
}

// ───────────────────────────────────────────────────────────────
// Persistent state ports (driven adapters: domain ↔ EEPROM)
// ───────────────────────────────────────────────────────────────

/// Alarm-threshold configuration with deferred write-back.
pub trait ConfigPort {
    /// Currently configured thresholds.
    fn thresholds(&self) -> Thresholds;

    /// Validate and stage new thresholds.  Persisted on the next flush.
    fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<(), ConfigError>;

    /// Write any staged configuration back to storage.
    fn flush_pending(&mut self) -> Result<(), ConfigError>;
}

/// Append-only, ordered event log with deferred write-back.
pub trait EventLogPort {
    /// Number of records currently held.
    fn len(&self) -> usize;

    /// Whether the log holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record `index` in storage order (0 = oldest).
    fn record(&self, index: usize) -> Option<LogRecord>;

    /// Append a record stamped with the current time.
    fn append(&mut self, event: EventKind);

    /// Write any staged records back to storage.
    fn flush_pending(&mut self) -> Result<(), StorageError>;
}

/// Persistent key-value storage (EEPROM / flash).
///
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic; no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostics console)
// ───────────────────────────────────────────────────────────────

/// The control core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage failed.
    Storage(StorageError),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
