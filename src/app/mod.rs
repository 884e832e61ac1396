//! Application core: the cyclic scheduler and its port boundary.
//!
//! The scheduler drives the request parser and the dispatcher; all
//! interaction with hardware, storage and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
