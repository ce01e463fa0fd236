use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;

use crate::Result;
use crate::api::models::{
    Capabilities, ConnectionError, ConnectionState, CredentialAttempt, NetworkObservation,
    PlatformProfile, ScanOutcome, TimeoutConfig,
};
use crate::core::connection::{ConnectionOrchestrator, select_strategy};
use crate::core::device::{enable_wifi, wifi_enabled};
use crate::core::permission::PermissionGate;
use crate::core::scan::ScanCoordinator;
use crate::monitoring::power::PowerMonitor;
use crate::monitoring::state::StateStore;
use crate::platform::{ConnectivityBroker, PermissionBroker, RadioFacility};

/// High-level interface to the Wi-Fi scan and connection core.
///
/// This is the main entry point. It owns the connection state machine and
/// exposes two observable values: the list of networks seen by the last scan
/// and the current [`ConnectionState`].
///
/// # Creating an Instance
///
/// The platform facilities are injected. When one object implements all
/// three facility traits, [`WifiManager::new`] is enough:
///
/// ```rust
/// use std::sync::Arc;
/// use wifimgr::WifiManager;
/// use wifimgr::platform::simulated::SimulatedPlatform;
///
/// let wm = WifiManager::new(Arc::new(SimulatedPlatform::new(33)));
/// assert_eq!(wm.strategy_name(), "scoped-request");
/// ```
///
/// Otherwise wire them one by one with [`WifiManager::builder`].
///
/// # Operations
///
/// - **Scanning**: [`start_scan`](Self::start_scan) replaces the network list
/// - **Connecting**: [`connect`](Self::connect) drives the state machine
/// - **Radio**: [`is_wifi_enabled`](Self::is_wifi_enabled), [`enable_wifi`](Self::enable_wifi)
/// - **Observing**: `subscribe_*` for watch receivers, `*_updates` for streams
///
/// Neither `start_scan` nor `connect` returns an error. Failures are
/// published as [`ConnectionState::Failed`].
///
/// # Example
///
/// ```no_run
/// use wifimgr::{ConnectionState, WifiManager};
///
/// # async fn example(wm: WifiManager) {
/// wm.start_scan().await;
///
/// match wm.connect("HomeNet", "validpw").await {
///     ConnectionState::Connected { ssid } => println!("Connected to {ssid}"),
///     ConnectionState::Failed { reason } => eprintln!("{reason}"),
///     _ => {}
/// }
/// # }
/// ```
///
/// # Thread Safety
///
/// `WifiManager` is `Clone` and can be shared across tasks. Clones share the
/// same state and collaborators.
#[derive(Clone)]
pub struct WifiManager {
    radio: Arc<dyn RadioFacility>,
    platform: PlatformProfile,
    timeouts: TimeoutConfig,
    gate: PermissionGate,
    store: StateStore,
    scanner: ScanCoordinator,
    orchestrator: ConnectionOrchestrator,
    power: Arc<PowerMonitor>,
}

impl Debug for WifiManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiManager")
            .field("platform", &self.platform)
            .field("timeouts", &self.timeouts)
            .field("strategy", &self.orchestrator.strategy_name())
            .field("state", &self.store.connection_state())
            .finish_non_exhaustive()
    }
}

impl WifiManager {
    /// Creates a manager over a single object implementing every facility,
    /// with default timeouts and the platform profile read from the radio.
    pub fn new<P>(platform: Arc<P>) -> Self
    where
        P: RadioFacility + ConnectivityBroker + PermissionBroker + 'static,
    {
        Self::with_config(platform, TimeoutConfig::default())
    }

    /// Same as [`new`](Self::new) with custom timeouts.
    pub fn with_config<P>(platform: Arc<P>, timeouts: TimeoutConfig) -> Self
    where
        P: RadioFacility + ConnectivityBroker + PermissionBroker + 'static,
    {
        let profile = PlatformProfile::detect(platform.as_ref());
        Self::assemble(
            platform.clone(),
            platform.clone(),
            platform,
            profile,
            timeouts,
        )
    }

    /// Returns a builder for wiring separate facilities.
    pub fn builder() -> WifiManagerBuilder {
        WifiManagerBuilder::default()
    }

    fn assemble(
        radio: Arc<dyn RadioFacility>,
        connectivity: Arc<dyn ConnectivityBroker>,
        permissions: Arc<dyn PermissionBroker>,
        platform: PlatformProfile,
        timeouts: TimeoutConfig,
    ) -> Self {
        let store = StateStore::new();
        let gate = PermissionGate::new(permissions, &platform);
        let scanner = ScanCoordinator::new(
            Arc::clone(&radio),
            gate.clone(),
            store.clone(),
            timeouts.scan_timeout,
        );
        let strategy = select_strategy(&platform, Arc::clone(&radio), connectivity, &timeouts);
        let orchestrator =
            ConnectionOrchestrator::new(gate.clone(), store.clone(), strategy, scanner.clone());

        log::debug!(
            "Wi-Fi manager ready: api level {}, {} strategy",
            platform.api_level,
            orchestrator.strategy_name()
        );

        Self {
            radio,
            platform,
            timeouts,
            gate,
            store,
            scanner,
            orchestrator,
            power: Arc::new(PowerMonitor::new()),
        }
    }

    /// Reads the latest scan results and replaces the network list.
    ///
    /// Without the required capabilities a grant prompt is issued and
    /// nothing else happens. A permission refusal from the query itself
    /// moves the connection state to `Failed("Permission denied for Wi-Fi scan")`.
    pub async fn start_scan(&self) -> ScanOutcome {
        self.scanner.start_scan().await
    }

    /// Connects to `ssid` and returns the state the attempt ended in.
    ///
    /// Pass an empty passphrase for an open network. Passphrase length is
    /// left to the platform; run [`validate_credentials`] first for an early
    /// check.
    ///
    /// A call made while another attempt is in flight is rejected before the
    /// capability check. It writes nothing and returns the current state.
    /// Calling this for the network already connected runs a full new
    /// attempt.
    ///
    /// The returned value is this attempt's outcome. The rescan that follows
    /// a successful attempt may still move the observable state, for example
    /// to `Failed` when the scan is refused.
    ///
    /// [`validate_credentials`]: crate::validate_credentials
    pub async fn connect(&self, ssid: &str, passphrase: &str) -> ConnectionState {
        self.orchestrator
            .connect(CredentialAttempt::new(ssid, passphrase))
            .await
    }

    /// Whether the Wi-Fi radio is on.
    pub fn is_wifi_enabled(&self) -> bool {
        wifi_enabled(self.radio.as_ref())
    }

    /// Switches the radio on, or on scoped-request platforms, asks the
    /// platform to show its Wi-Fi settings panel.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::Radio` if the platform call fails.
    pub fn enable_wifi(&self) -> Result<()> {
        enable_wifi(self.radio.as_ref(), &self.platform)
    }

    /// Whether every required capability is granted.
    pub fn has_required_capabilities(&self) -> bool {
        self.gate.has_required_capabilities()
    }

    /// Prompts for the required capabilities.
    pub fn request_capabilities(&self) {
        self.gate.request_capabilities();
    }

    /// The capability set required on this platform.
    pub fn required_capabilities(&self) -> Capabilities {
        self.gate.required()
    }

    /// Snapshot of the network list.
    pub fn networks(&self) -> Vec<NetworkObservation> {
        self.store.networks()
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.store.connection_state()
    }

    /// Subscribes to network list updates.
    pub fn subscribe_networks(&self) -> watch::Receiver<Vec<NetworkObservation>> {
        self.store.subscribe_networks()
    }

    /// Subscribes to connection state updates.
    pub fn subscribe_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.store.subscribe_connection()
    }

    /// Network list as a stream, starting with the current value.
    pub fn network_updates(&self) -> impl Stream<Item = Vec<NetworkObservation>> + use<> {
        self.store.network_updates()
    }

    /// Connection state as a stream, starting with the current value.
    pub fn connection_updates(&self) -> impl Stream<Item = ConnectionState> + use<> {
        self.store.connection_updates()
    }

    /// The shared state store.
    pub fn state_store(&self) -> &StateStore {
        &self.store
    }

    /// Power-source telemetry published alongside the Wi-Fi state.
    ///
    /// The host feeds battery readings through [`PowerMonitor::publish`].
    pub fn power(&self) -> &PowerMonitor {
        &self.power
    }

    /// The platform profile chosen at construction.
    pub fn platform(&self) -> PlatformProfile {
        self.platform
    }

    /// The timeout configuration.
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeouts
    }

    /// Name of the connection strategy in use.
    pub fn strategy_name(&self) -> &'static str {
        self.orchestrator.strategy_name()
    }
}

/// Builder for [`WifiManager`] with separately supplied facilities.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use wifimgr::{PlatformProfile, TimeoutConfig, WifiManager};
/// use wifimgr::platform::simulated::SimulatedPlatform;
///
/// let sim = Arc::new(SimulatedPlatform::new(33));
/// let wm = WifiManager::builder()
///     .radio(sim.clone())
///     .connectivity(sim.clone())
///     .permissions(sim)
///     .platform(PlatformProfile::new(28))
///     .timeouts(TimeoutConfig::new().with_scan_timeout(Duration::from_secs(2)))
///     .build()
///     .unwrap();
///
/// assert_eq!(wm.strategy_name(), "legacy-profile");
/// ```
#[derive(Default)]
pub struct WifiManagerBuilder {
    radio: Option<Arc<dyn RadioFacility>>,
    connectivity: Option<Arc<dyn ConnectivityBroker>>,
    permissions: Option<Arc<dyn PermissionBroker>>,
    platform: Option<PlatformProfile>,
    timeouts: TimeoutConfig,
}

impl WifiManagerBuilder {
    /// Sets the radio facility.
    pub fn radio(mut self, radio: Arc<dyn RadioFacility>) -> Self {
        self.radio = Some(radio);
        self
    }

    /// Sets the connectivity broker.
    pub fn connectivity(mut self, connectivity: Arc<dyn ConnectivityBroker>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Sets the permission broker.
    pub fn permissions(mut self, permissions: Arc<dyn PermissionBroker>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Overrides the platform profile. Defaults to [`PlatformProfile::detect`].
    pub fn platform(mut self, platform: PlatformProfile) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the timeouts.
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Builds the manager.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::Config` if a facility was not supplied.
    pub fn build(self) -> Result<WifiManager> {
        let radio = self
            .radio
            .ok_or_else(|| ConnectionError::Config("radio facility not set".into()))?;
        let connectivity = self
            .connectivity
            .ok_or_else(|| ConnectionError::Config("connectivity broker not set".into()))?;
        let permissions = self
            .permissions
            .ok_or_else(|| ConnectionError::Config("permission broker not set".into()))?;
        let platform = self
            .platform
            .unwrap_or_else(|| PlatformProfile::detect(radio.as_ref()));

        Ok(WifiManager::assemble(
            radio,
            connectivity,
            permissions,
            platform,
            self.timeouts,
        ))
    }
}
