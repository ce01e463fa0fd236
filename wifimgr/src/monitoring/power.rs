//! Power-source telemetry.
//!
//! The platform broadcasts raw battery readings whenever the charge level or
//! status changes. [`PowerMonitor`] converts them into [`PowerSnapshot`]s and
//! publishes the latest one with the same watch semantics as the
//! [`StateStore`](crate::StateStore).

use log::debug;
use tokio::sync::watch;

use crate::api::models::{BatteryReading, PowerSnapshot};

/// Latest-value publisher for battery telemetry.
#[derive(Debug)]
pub struct PowerMonitor {
    tx: watch::Sender<Option<PowerSnapshot>>,
}

impl Default for PowerMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerMonitor {
    /// Creates a monitor with no reading yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Feeds a raw reading from the platform broadcast.
    ///
    /// Returns the derived snapshot. Observers are only woken when the
    /// snapshot differs from the previous one.
    pub fn publish(&self, reading: BatteryReading) -> PowerSnapshot {
        let snapshot = PowerSnapshot::from(reading);
        self.tx.send_if_modified(|current| {
            if *current == Some(snapshot) {
                false
            } else {
                debug!(
                    "Battery: {}% ({})",
                    snapshot
                        .percent
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "?".into()),
                    snapshot.charge_status
                );
                *current = Some(snapshot);
                true
            }
        });
        snapshot
    }

    /// Returns the latest snapshot, if any reading arrived.
    pub fn latest(&self) -> Option<PowerSnapshot> {
        *self.tx.borrow()
    }

    /// Whether the latest reading says the device is charging or full.
    pub fn is_charging(&self) -> bool {
        self.latest().is_some_and(|s| s.is_charging())
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<PowerSnapshot>> {
        self.tx.subscribe()
    }
}
