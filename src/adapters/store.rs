//! Device store: thresholds, event log and identity on top of a
//! [`StoragePort`].
//!
//! Implements [`ConfigPort`] and [`EventLogPort`].  Changes are staged in
//! RAM and marked dirty; the scheduler writes them back during idle
//! housekeeping so EEPROM writes never delay a request.
//!
//! The event log is a bounded ring of [`LOG_CAPACITY`] records: when full
//! the oldest record is dropped.  Records are never reordered.
//!
//! Blobs are `postcard`-encoded under the `tempmon` namespace.

use heapless::Deque;
use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::ports::{
    ConfigError, ConfigPort, EventLogPort, StorageError, StoragePort, WallClock,
};
use crate::config::Thresholds;
use crate::telemetry::{EventKind, LogRecord, Vpd};

/// Maximum number of records held by the event log.
pub const LOG_CAPACITY: usize = 16;

const NAMESPACE: &str = "tempmon";
const KEY_THRESHOLDS: &str = "thresholds";
const KEY_EVENT_LOG: &str = "eventlog";
const KEY_VPD: &str = "vpd";

/// Largest blob the store reads back.
const MAX_BLOB: usize = 256;

pub struct DeviceStore<S: StoragePort, C: WallClock> {
    storage: S,
    clock: C,
    thresholds: Thresholds,
    log: Deque<LogRecord, LOG_CAPACITY>,
    vpd: Vpd,
    thresholds_dirty: bool,
    log_dirty: bool,
}

impl<S: StoragePort, C: WallClock> DeviceStore<S, C> {
    /// Load everything persisted in `storage`.  Missing or corrupted
    /// blobs fall back to `factory` thresholds, an empty log and the
    /// default identity.
    pub fn open(storage: S, clock: C, factory: Thresholds) -> Self {
        let thresholds = match load::<Thresholds>(&storage, KEY_THRESHOLDS) {
            Some(t) if t.validate().is_ok() => t,
            Some(_) => {
                warn!("store: stored thresholds out of order, using factory values");
                factory
            }
            None => factory,
        };

        let mut log = Deque::new();
        for record in load::<Vec<LogRecord>>(&storage, KEY_EVENT_LOG).unwrap_or_default() {
            push_bounded(&mut log, record);
        }

        let vpd = load::<Vpd>(&storage, KEY_VPD).unwrap_or_default();

        info!(
            "store: opened ({} log records, serial {})",
            log.len(),
            vpd.serial_number
        );

        Self {
            storage,
            clock,
            thresholds,
            log,
            vpd,
            thresholds_dirty: false,
            log_dirty: false,
        }
    }

    /// Device identity block.
    pub fn vpd(&self) -> &Vpd {
        &self.vpd
    }

    /// Write a new identity block (factory provisioning).  Written
    /// through immediately.
    pub fn provision_vpd(&mut self, vpd: Vpd) -> Result<(), StorageError> {
        save(&mut self.storage, KEY_VPD, &vpd)?;
        info!("store: provisioned {} {}", vpd.model, vpd.serial_number);
        self.vpd = vpd;
        Ok(())
    }

    /// Staged changes not yet written back.
    pub fn has_pending(&self) -> bool {
        self.thresholds_dirty || self.log_dirty
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the store, returning the backing storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn push_bounded(log: &mut Deque<LogRecord, LOG_CAPACITY>, record: LogRecord) {
    if log.is_full() {
        log.pop_front();
    }
    // Cannot fail: a slot was freed above.
    let _ = log.push_back(record);
}

fn load<T: DeserializeOwned>(storage: &impl StoragePort, key: &str) -> Option<T> {
    let mut buf = [0u8; MAX_BLOB];
    let n = match storage.read(NAMESPACE, key, &mut buf) {
        Ok(n) => n,
        Err(StorageError::NotFound) => return None,
        Err(e) => {
            warn!("store: reading {} failed: {}", key, e);
            return None;
        }
    };
    match postcard::from_bytes(&buf[..n]) {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("store: {} is corrupted, ignoring it", key);
            None
        }
    }
}

fn save<T: Serialize + ?Sized>(
    storage: &mut impl StoragePort,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = postcard::to_allocvec(value).map_err(|_| StorageError::IoError)?;
    storage.write(NAMESPACE, key, &bytes)
}

// ── ConfigPort implementation ─────────────────────────────────

impl<S: StoragePort, C: WallClock> ConfigPort for DeviceStore<S, C> {
    fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<(), ConfigError> {
        thresholds.validate().map_err(ConfigError::ValidationFailed)?;
        if thresholds != self.thresholds {
            self.thresholds = thresholds;
            self.thresholds_dirty = true;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<(), ConfigError> {
        if !self.thresholds_dirty {
            return Ok(());
        }
        save(&mut self.storage, KEY_THRESHOLDS, &self.thresholds)?;
        self.thresholds_dirty = false;
        info!("store: thresholds written back");
        Ok(())
    }
}

// ── EventLogPort implementation ───────────────────────────────

impl<S: StoragePort, C: WallClock> EventLogPort for DeviceStore<S, C> {
    fn len(&self) -> usize {
        self.log.len()
    }

    fn record(&self, index: usize) -> Option<LogRecord> {
        self.log.iter().nth(index).copied()
    }

    fn append(&mut self, event: EventKind) {
        let record = LogRecord {
            timestamp: self.clock.now(),
            event,
        };
        push_bounded(&mut self.log, record);
        self.log_dirty = true;
    }

    fn flush_pending(&mut self) -> Result<(), StorageError> {
        if !self.log_dirty {
            return Ok(());
        }
        let records: Vec<LogRecord> = self.log.iter().copied().collect();
        save(&mut self.storage, KEY_EVENT_LOG, &records)?;
        self.log_dirty = false;
        Ok(())
    }
}
