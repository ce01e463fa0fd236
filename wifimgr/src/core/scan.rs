//! Wi-Fi scan coordination.
//!
//! Reads the platform's latest scan results, quantizes their signal
//! strength, tags the associated network, and replaces the observable
//! network list in one step. The scan-results query blocks, so it runs on
//! the blocking worker pool.

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::{debug, error, warn};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::api::models::{
    ConnectionError, ConnectionState, NetworkObservation, RawScanResult, ScanOutcome,
};
use crate::core::in_flight::InFlight;
use crate::core::permission::PermissionGate;
use crate::monitoring::state::StateStore;
use crate::platform::{RadioError, RadioFacility};
use crate::try_log;
use crate::util::utils::{normalize_ssid, signal_level};

/// Runs scans and publishes their results.
#[derive(Clone)]
pub(crate) struct ScanCoordinator {
    radio: Arc<dyn RadioFacility>,
    gate: PermissionGate,
    store: StateStore,
    scan_timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

impl ScanCoordinator {
    pub(crate) fn new(
        radio: Arc<dyn RadioFacility>,
        gate: PermissionGate,
        store: StateStore,
        scan_timeout: Duration,
    ) -> Self {
        Self {
            radio,
            gate,
            store,
            scan_timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queries scan results and replaces the network list.
    ///
    /// A permission refusal from the query moves the connection state to
    /// `Failed` and leaves the network list untouched. Any other failure is
    /// logged and also leaves the list untouched.
    pub(crate) async fn start_scan(&self) -> ScanOutcome {
        if !self.gate.ensure("scan") {
            return ScanOutcome::PermissionRequested;
        }

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Scan already in flight, ignoring request");
            return ScanOutcome::Busy;
        };

        let radio = Arc::clone(&self.radio);
        let query = tokio::task::spawn_blocking(move || query_networks(radio.as_ref()));
        let mut timeout_delay = pin!(Delay::new(self.scan_timeout).fuse());

        let result = select! {
            joined = query.fuse() => joined,
            _ = timeout_delay => {
                warn!("Scan query timed out after {:?}", self.scan_timeout);
                return ScanOutcome::Failed("scan timed out".into());
            }
        };

        match result {
            Ok(Ok(observations)) => {
                let count = observations.len();
                debug!("Scan found {count} networks");
                self.store.replace_networks(observations);
                ScanOutcome::Updated(count)
            }
            Ok(Err(RadioError::PermissionDenied(msg))) => {
                warn!("Permission not granted for Wi-Fi scan: {msg}");
                self.store
                    .transition(ConnectionState::failed(&ConnectionError::ScanPermissionDenied));
                ScanOutcome::PermissionDenied
            }
            Ok(Err(e)) => {
                warn!("Wi-Fi scan failed: {e}");
                ScanOutcome::Failed(e.to_string())
            }
            Err(e) => {
                error!("Scan worker failed: {e}");
                ScanOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Reads scan results and the associated identity, and builds observations.
/// Blocking.
pub(crate) fn query_networks(
    radio: &dyn RadioFacility,
) -> Result<Vec<NetworkObservation>, RadioError> {
    let results = radio.scan_results()?;
    let associated = associated_ssid(radio);
    debug!(
        "Scan returned {} results, associated with {:?}",
        results.len(),
        associated
    );
    Ok(observe(&results, associated.as_deref()))
}

/// Returns the SSID of the associated network.
///
/// A failed lookup (typically a restricted permission) means "unknown", not
/// an error.
fn associated_ssid(radio: &dyn RadioFacility) -> Option<String> {
    let raw = try_log!(
        radio.current_associated_id(),
        "Failed to read associated network"
    )?;
    normalize_ssid(&raw)
}

/// Builds observations for one scan cycle.
///
/// When several results share the associated SSID (one network served by
/// several access points), only the strongest is tagged, so at most one
/// observation per cycle is marked associated.
pub(crate) fn observe(
    results: &[RawScanResult],
    associated: Option<&str>,
) -> Vec<NetworkObservation> {
    let tagged = associated.and_then(|ssid| {
        results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.ssid == ssid)
            .max_by(|(ia, a), (ib, b)| a.rssi.cmp(&b.rssi).then(ib.cmp(ia)))
            .map(|(i, _)| i)
    });

    results
        .iter()
        .enumerate()
        .map(|(i, r)| NetworkObservation {
            ssid: r.ssid.clone(),
            signal_level: signal_level(r.rssi),
            is_associated: Some(i) == tagged,
        })
        .collect()
}
