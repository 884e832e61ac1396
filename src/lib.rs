//! TempMon firmware core library.
//!
//! Exposes the cyclic scheduler, the request-parsing state machine and
//! the response dispatcher, together with the host adapters used by the
//! simulation binary and the integration tests.

#![deny(unused_must_use)]

pub mod alarm;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod sensors;
