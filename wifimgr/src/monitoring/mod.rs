//! Observable state and telemetry.
//!
//! This module provides the state store observers subscribe to, and the
//! battery telemetry publisher.

pub(crate) mod power;
pub(crate) mod state;
