//! Core internal logic for scanning and connection management.
//!
//! This module contains the capability gate, the scan coordinator, the
//! connection orchestrator with its platform strategies, and the wait on
//! scoped request callbacks.

pub(crate) mod connection;
pub(crate) mod device;
pub(crate) mod in_flight;
pub(crate) mod permission;
pub(crate) mod scan;
pub(crate) mod state_wait;
