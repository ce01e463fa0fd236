//! Connection orchestration.
//!
//! `connect()` runs the same outer sequence on every platform:
//!
//! 1. Claim the in-flight slot. If another attempt holds it, the call is
//!    rejected without writing any state and the current state is returned.
//! 2. Check capabilities. If any is missing, publish `Failed`, issue a grant
//!    prompt and stop.
//! 3. Publish `Connecting`.
//! 4. Hand the credentials to the platform's [`ConnectStrategy`].
//! 5. Publish `Connected` and rescan, or publish `Failed`.
//!
//! The slot is held until step 5 completes, so "busy" never depends on what
//! other writers have published in the meantime.
//!
//! Two strategies exist and exactly one is chosen, once, from the
//! [`PlatformProfile`]:
//!
//! - [`ScopedRequestStrategy`] issues a one-shot network request and waits
//!   for the broker's callback, then binds the process to the network.
//! - [`LegacyProfileStrategy`] stores a profile, drops the current
//!   association, enables the profile and forces reassociation. These calls
//!   block and run on the blocking worker pool.
//!
//! Every strategy error ends up as a `Failed` state; nothing is returned to
//! the caller as an `Err`.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::Result;
use crate::api::builders::{build_legacy_profile, build_scoped_request};
use crate::api::models::{
    ConnectionError, ConnectionState, CredentialAttempt, PlatformProfile, TimeoutConfig,
};
use crate::core::in_flight::InFlight;
use crate::core::permission::PermissionGate;
use crate::core::scan::ScanCoordinator;
use crate::core::state_wait::{OneShotCallback, wait_for_availability};
use crate::monitoring::state::StateStore;
use crate::platform::{ConnectivityBroker, RadioFacility};

/// A way of associating with a network.
#[async_trait]
pub(crate) trait ConnectStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Associates with `attempt.ssid`. `Ok(())` means associated.
    async fn associate(&self, attempt: CredentialAttempt) -> Result<()>;
}

/// Picks the strategy for this platform.
pub(crate) fn select_strategy(
    platform: &PlatformProfile,
    radio: Arc<dyn RadioFacility>,
    broker: Arc<dyn ConnectivityBroker>,
    timeouts: &TimeoutConfig,
) -> Arc<dyn ConnectStrategy> {
    if platform.supports_scoped_requests() {
        Arc::new(ScopedRequestStrategy {
            broker,
            timeout: timeouts.scoped_request_timeout,
        })
    } else {
        Arc::new(LegacyProfileStrategy { radio })
    }
}

/// Strategy for platforms with scoped network requests.
pub(crate) struct ScopedRequestStrategy {
    broker: Arc<dyn ConnectivityBroker>,
    timeout: Duration,
}

#[async_trait]
impl ConnectStrategy for ScopedRequestStrategy {
    fn name(&self) -> &'static str {
        "scoped-request"
    }

    async fn associate(&self, attempt: CredentialAttempt) -> Result<()> {
        let request = build_scoped_request(&attempt)?;
        let ssid = attempt.ssid;

        let (callback, rx) = OneShotCallback::channel();
        let request_id = self.broker.request_network(request, callback)?;
        debug!("Issued {request_id} for '{ssid}'");

        let network = match wait_for_availability(rx, &ssid, self.timeout).await {
            Ok(network) => network,
            Err(e @ ConnectionError::Timeout(_)) => {
                if let Err(release_err) = self.broker.release_request(request_id) {
                    warn!("Failed to release {request_id}: {release_err}");
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if self.broker.bind_process_to_network(network)? {
            debug!("Bound process to {network}");
        } else {
            warn!("Platform refused to bind process to {network}");
        }

        Ok(())
    }
}

/// Strategy for platforms with only the legacy configuration API.
pub(crate) struct LegacyProfileStrategy {
    radio: Arc<dyn RadioFacility>,
}

#[async_trait]
impl ConnectStrategy for LegacyProfileStrategy {
    fn name(&self) -> &'static str {
        "legacy-profile"
    }

    async fn associate(&self, attempt: CredentialAttempt) -> Result<()> {
        let radio = Arc::clone(&self.radio);
        let ssid = attempt.ssid.clone();

        let associated =
            tokio::task::spawn_blocking(move || run_legacy_sequence(radio.as_ref(), &attempt))
                .await
                .map_err(|e| ConnectionError::Unexpected(e.to_string()))??;

        if associated {
            Ok(())
        } else {
            Err(ConnectionError::LegacyConnectFailed(ssid))
        }
    }
}

/// Runs add/disconnect/enable/reconnect. Blocking.
///
/// Success is the combined result of enable and reconnect; reconnect is not
/// attempted when enable fails. A negative profile id means the platform
/// rejected the profile.
fn run_legacy_sequence(radio: &dyn RadioFacility, attempt: &CredentialAttempt) -> Result<bool> {
    let profile = build_legacy_profile(attempt);
    let id = radio.add_profile(&profile)?;
    debug!("Added legacy profile {id} for '{}'", profile.unquoted_ssid());

    if !radio.disconnect()? {
        debug!("No association to drop");
    }

    if id < 0 {
        warn!("Platform rejected legacy profile for '{}'", attempt.ssid);
        return Ok(false);
    }

    Ok(radio.enable_profile(id, true)? && radio.reconnect()?)
}

/// Owns the connection state machine.
#[derive(Clone)]
pub(crate) struct ConnectionOrchestrator {
    gate: PermissionGate,
    store: StateStore,
    strategy: Arc<dyn ConnectStrategy>,
    scanner: ScanCoordinator,
    in_flight: Arc<AtomicBool>,
}

impl ConnectionOrchestrator {
    pub(crate) fn new(
        gate: PermissionGate,
        store: StateStore,
        strategy: Arc<dyn ConnectStrategy>,
        scanner: ScanCoordinator,
    ) -> Self {
        Self {
            gate,
            store,
            strategy,
            scanner,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Runs one connection attempt and returns the state it ended in.
    ///
    /// The returned value is this attempt's outcome. The follow-up rescan
    /// may publish a scan failure afterwards, so the store can already hold
    /// a different state when this returns.
    ///
    /// When rejected because another attempt is in flight, returns the
    /// current state without doing anything.
    pub(crate) async fn connect(&self, attempt: CredentialAttempt) -> ConnectionState {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!(
                "Connection attempt already in flight, rejecting '{}'",
                attempt.ssid
            );
            return self.store.connection_state();
        };

        if !self.gate.has_required_capabilities() {
            let err = ConnectionError::PermissionsNotGranted;
            warn!("Cannot connect to '{}': {err}", attempt.ssid);
            let failed = ConnectionState::failed(&err);
            self.store.transition(failed.clone());
            self.gate.request_capabilities();
            return failed;
        }

        self.store.transition(ConnectionState::Connecting);

        let ssid = attempt.ssid.clone();
        debug!(
            "Connecting to '{ssid}' via {} (attempt {})",
            self.strategy.name(),
            attempt.id
        );

        match self.strategy.associate(attempt).await {
            Ok(()) => {
                info!("Successfully connected to '{ssid}'");
                let connected = ConnectionState::Connected { ssid };
                self.store.transition(connected.clone());
                self.scanner.start_scan().await;
                connected
            }
            Err(e) => {
                let err = e.into_strategy_failure();
                warn!("Connection to '{ssid}' failed: {err}");
                let failed = ConnectionState::failed(&err);
                self.store.transition(failed.clone());
                failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Capabilities;
    use crate::platform::simulated::{ScopedBehavior, SimulatedPlatform};

    fn orchestrator(platform: &Arc<SimulatedPlatform>, timeouts: TimeoutConfig) -> ConnectionOrchestrator {
        let profile = PlatformProfile::detect(platform.as_ref());
        let store = StateStore::new();
        let gate = PermissionGate::new(platform.clone(), &profile);
        let scanner = ScanCoordinator::new(
            platform.clone(),
            gate.clone(),
            store.clone(),
            timeouts.scan_timeout,
        );
        let strategy = select_strategy(&profile, platform.clone(), platform.clone(), &timeouts);
        ConnectionOrchestrator::new(gate, store, strategy, scanner)
    }

    #[test]
    fn strategy_selected_by_api_level() {
        let modern = Arc::new(SimulatedPlatform::new(33));
        let legacy = Arc::new(SimulatedPlatform::new(28));

        assert_eq!(
            orchestrator(&modern, TimeoutConfig::default()).strategy_name(),
            "scoped-request"
        );
        assert_eq!(
            orchestrator(&legacy, TimeoutConfig::default()).strategy_name(),
            "legacy-profile"
        );
    }

    #[tokio::test]
    async fn scoped_timeout_releases_request() {
        let platform = Arc::new(SimulatedPlatform::new(33));
        platform.grant(Capabilities::all());
        platform.set_scoped_behavior(ScopedBehavior::Silent);

        let orch = orchestrator(
            &platform,
            TimeoutConfig::new().with_scoped_request_timeout(Duration::from_millis(20)),
        );
        let state = orch.connect(CredentialAttempt::new("HomeNet", "validpw1")).await;

        assert_eq!(
            state,
            ConnectionState::Failed {
                reason: "Timed out waiting for HomeNet to become available".into()
            }
        );
        assert_eq!(platform.released_requests(), 1);
    }

    #[tokio::test]
    async fn legacy_enable_failure_skips_reconnect() {
        let platform = Arc::new(SimulatedPlatform::new(28));
        platform.grant(Capabilities::all());
        platform.set_legacy_results(false, true);

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let state = orch.connect(CredentialAttempt::new("HomeNet", "validpw1")).await;

        assert_eq!(
            state,
            ConnectionState::Failed {
                reason: "Failed to connect to HomeNet".into()
            }
        );
        assert_eq!(platform.reconnect_calls(), 0);
        assert_eq!(platform.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn legacy_rejected_profile_fails() {
        let platform = Arc::new(SimulatedPlatform::new(28));
        platform.grant(Capabilities::all());
        platform.reject_profiles(true);

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let state = orch.connect(CredentialAttempt::new("HomeNet", "validpw1")).await;

        assert_eq!(
            state,
            ConnectionState::Failed {
                reason: "Failed to connect to HomeNet".into()
            }
        );
        assert_eq!(platform.scan_queries(), 0);
    }

    #[tokio::test]
    async fn invalid_ssid_fails_after_connecting() {
        let platform = Arc::new(SimulatedPlatform::new(33));
        platform.grant(Capabilities::all());

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let mut rx = orch.store.subscribe_connection();
        let state = orch.connect(CredentialAttempt::new("", "validpw")).await;

        match state {
            ConnectionState::Failed { reason } => {
                assert!(reason.starts_with("Error connecting to network: invalid SSID"))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(rx.has_changed().unwrap());
        assert_eq!(platform.network_requests(), 0);
    }

    #[tokio::test]
    async fn short_passphrase_reaches_legacy_platform() {
        let platform = Arc::new(SimulatedPlatform::new(28));
        platform.grant(Capabilities::all());

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let state = orch.connect(CredentialAttempt::new("HomeNet", "validpw")).await;

        assert_eq!(state.connected_ssid(), Some("HomeNet"));
        assert_eq!(platform.profiles(), vec!["\"HomeNet\"".to_string()]);
    }

    #[tokio::test]
    async fn busy_attempt_rejected_before_permission_check() {
        let platform = Arc::new(SimulatedPlatform::new(33));
        platform.grant(Capabilities::all());
        platform.set_scoped_behavior(ScopedBehavior::Silent);

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let first = tokio::spawn({
            let orch = orch.clone();
            async move { orch.connect(CredentialAttempt::new("HomeNet", "validpw")).await }
        });
        while platform.network_requests() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        platform.revoke(Capabilities::FINE_LOCATION);
        let rejected = orch.connect(CredentialAttempt::new("OtherNet", "validpw")).await;

        assert_eq!(rejected, ConnectionState::Connecting);
        assert_eq!(orch.store.connection_state(), ConnectionState::Connecting);
        assert_eq!(platform.grant_requests(), 0);

        platform.resolve_pending(true);
        assert_eq!(first.await.unwrap().connected_ssid(), Some("HomeNet"));
    }

    #[tokio::test]
    async fn broker_error_is_wrapped() {
        let platform = Arc::new(SimulatedPlatform::new(33));
        platform.grant(Capabilities::all());
        platform.set_scoped_behavior(ScopedBehavior::Reject(
            crate::platform::RadioError::Unavailable("broker down".into()),
        ));

        let orch = orchestrator(&platform, TimeoutConfig::default());
        let state = orch.connect(CredentialAttempt::new("HomeNet", "validpw1")).await;

        assert_eq!(
            state,
            ConnectionState::Failed {
                reason: "Error connecting to network: radio error: radio unavailable: broker down"
                    .into()
            }
        );
    }
}
