//! EEPROM storage adapter.
//!
//! Implements [`StoragePort`] over the appliance's on-board EEPROM.  The
//! host build keeps the cells in memory with the same byte budget as the
//! part, so a layout that would overflow the chip fails here too.
//!
//! - Namespace isolation: keys are stored as `namespace::key`.
//! - Atomic writes: a blob is replaced whole or not at all.

use std::collections::HashMap;

use log::{debug, info};

use crate::app::ports::{StorageError, StoragePort};

/// Usable EEPROM size in bytes.
pub const EEPROM_CAPACITY: usize = 1024;

pub struct EepromAdapter {
    cells: HashMap<String, Vec<u8>>,
    capacity: usize,
    write_protected: bool,
    writes: u32,
}

impl Default for EepromAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl EepromAdapter {
    pub fn new() -> Self {
        Self::with_capacity(EEPROM_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        info!("EEPROM(sim): {} bytes", capacity);
        Self {
            cells: HashMap::new(),
            capacity,
            write_protected: false,
            writes: 0,
        }
    }

    /// Reject every write and delete with an I/O error, as the part does
    /// with its write-protect pin asserted.
    pub fn set_write_protect(&mut self, on: bool) {
        self.write_protected = on;
    }

    /// Successful writes since construction.
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Bytes in use across every blob.
    pub fn used(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }
}

impl StoragePort for EepromAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self
            .cells
            .get(&Self::composite_key(namespace, key))
            .ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.write_protected {
            return Err(StorageError::IoError);
        }
        let composite = Self::composite_key(namespace, key);
        let replaced = self.cells.get(&composite).map_or(0, Vec::len);
        if self.used() - replaced + data.len() > self.capacity {
            return Err(StorageError::Full);
        }
        debug!("EEPROM(sim): {} <- {} bytes", composite, data.len());
        self.cells.insert(composite, data.to_vec());
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if self.write_protected {
            return Err(StorageError::IoError);
        }
        self.cells.remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.cells.contains_key(&Self::composite_key(namespace, key))
    }
}
