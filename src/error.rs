//! Unified error types for the TempMon firmware.
//!
//! Each collaborator port reports its own small `Copy` error enum; they
//! all convert into [`Error`] so the start-up path in the binary can use
//! `?` uniformly.  The cyclic scheduler itself never propagates errors:
//! it logs them and keeps looping.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The connection channel failed.
    Channel(ChannelError),
    /// Configuration is invalid or could not be persisted.
    Config(ConfigError),
    /// The non-volatile store failed.
    Storage(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Operation requires an established connection.
    NotConnected,
    /// The listening socket could not be opened.
    ListenFailed,
    /// TCP or socket I/O failure.
    Io,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no client connected"),
            Self::ListenFailed => write!(f, "could not open listening socket"),
            Self::Io => write!(f, "socket I/O error"),
        }
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
