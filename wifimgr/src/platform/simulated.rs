//! In-memory platform.
//!
//! [`SimulatedPlatform`] implements the radio, connectivity and permission
//! facilities over plain state, with knobs for every outcome the
//! orchestrator distinguishes. It backs the crate's tests and examples, and
//! is handy for exercising a UI without hardware.
//!
//! Scoped request callbacks are delivered from a freshly spawned thread by
//! default, the way a real platform delivers them off the caller's context.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::api::builders::{LegacyProfile, ScopedNetworkRequest};
use crate::api::models::{Capabilities, RawScanResult};
use crate::platform::{
    ConnectivityBroker, NetworkCallback, NetworkHandle, PermissionBroker, ProfileId,
    RadioError, RadioFacility, RequestId,
};

/// How the simulated broker answers scoped requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedBehavior {
    /// Report the network available and associate with it.
    Available,
    /// Report the network unavailable.
    Unavailable,
    /// Never answer until [`SimulatedPlatform::resolve_pending`] is called.
    Silent,
    /// Refuse to issue the request.
    Reject(RadioError),
}

struct PendingRequest {
    ssid: String,
    callback: Arc<dyn NetworkCallback>,
}

struct SimState {
    radio_enabled: bool,
    granted: Capabilities,
    grant_on_request: bool,
    scan_results: Vec<RawScanResult>,
    scan_error: Option<RadioError>,
    scan_delay: Option<Duration>,
    associated: Option<String>,
    associated_error: Option<RadioError>,
    scoped: ScopedBehavior,
    callbacks_on_thread: bool,
    pending: HashMap<RequestId, PendingRequest>,
    bound: Option<NetworkHandle>,
    profiles: Vec<String>,
    enabled_profile: Option<ProfileId>,
    reject_profiles: bool,
    legacy_enable_ok: bool,
    legacy_reconnect_ok: bool,
    grant_requests: usize,
    scan_queries: usize,
    network_requests: usize,
    released_requests: usize,
    disconnect_calls: usize,
    reconnect_calls: usize,
    panel_requests: usize,
}

/// In-memory implementation of every platform facility.
pub struct SimulatedPlatform {
    api_level: u32,
    next_id: AtomicU64,
    state: Mutex<SimState>,
}

impl Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedPlatform")
            .field("api_level", &self.api_level)
            .finish_non_exhaustive()
    }
}

impl SimulatedPlatform {
    /// Creates a platform at `api_level` with the radio on, no scan results,
    /// no association and no capabilities granted.
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            next_id: AtomicU64::new(1),
            state: Mutex::new(SimState {
                radio_enabled: true,
                granted: Capabilities::empty(),
                grant_on_request: false,
                scan_results: Vec::new(),
                scan_error: None,
                scan_delay: None,
                associated: None,
                associated_error: None,
                scoped: ScopedBehavior::Available,
                callbacks_on_thread: true,
                pending: HashMap::new(),
                bound: None,
                profiles: Vec::new(),
                enabled_profile: None,
                reject_profiles: false,
                legacy_enable_ok: true,
                legacy_reconnect_ok: true,
                grant_requests: 0,
                scan_queries: 0,
                network_requests: 0,
                released_requests: 0,
                disconnect_calls: 0,
                reconnect_calls: 0,
                panel_requests: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Grants capabilities.
    pub fn grant(&self, capabilities: Capabilities) {
        self.state().granted |= capabilities;
    }

    /// Revokes capabilities.
    pub fn revoke(&self, capabilities: Capabilities) {
        self.state().granted -= capabilities;
    }

    /// When set, a grant prompt grants everything it asked for.
    pub fn set_grant_on_request(&self, grant: bool) {
        self.state().grant_on_request = grant;
    }

    /// Switches the simulated radio on or off.
    pub fn set_radio_enabled(&self, enabled: bool) {
        self.state().radio_enabled = enabled;
    }

    /// Replaces the results returned by the next scan queries.
    pub fn set_scan_results(&self, results: Vec<RawScanResult>) {
        self.state().scan_results = results;
    }

    /// Makes scan queries fail with `error`, or succeed again with `None`.
    pub fn set_scan_error(&self, error: Option<RadioError>) {
        self.state().scan_error = error;
    }

    /// Makes every scan query block for `delay` before answering.
    pub fn set_scan_delay(&self, delay: Option<Duration>) {
        self.state().scan_delay = delay;
    }

    /// Sets the raw associated-network identifier, quotes included.
    pub fn set_associated(&self, id: Option<&str>) {
        self.state().associated = id.map(str::to_string);
    }

    /// Makes the associated-network lookup fail with `error`.
    pub fn set_associated_error(&self, error: Option<RadioError>) {
        self.state().associated_error = error;
    }

    /// Chooses how scoped requests are answered.
    pub fn set_scoped_behavior(&self, behavior: ScopedBehavior) {
        self.state().scoped = behavior;
    }

    /// Delivers scoped callbacks inline instead of from a spawned thread.
    pub fn set_callbacks_inline(&self, inline: bool) {
        self.state().callbacks_on_thread = !inline;
    }

    /// Sets the results of the legacy enable and reconnect calls.
    pub fn set_legacy_results(&self, enable_ok: bool, reconnect_ok: bool) {
        let mut state = self.state();
        state.legacy_enable_ok = enable_ok;
        state.legacy_reconnect_ok = reconnect_ok;
    }

    /// Makes `add_profile` reject every profile.
    pub fn reject_profiles(&self, reject: bool) {
        self.state().reject_profiles = reject;
    }

    /// Answers every outstanding silent request.
    ///
    /// Returns how many requests were resolved.
    pub fn resolve_pending(&self, available: bool) -> usize {
        let pending: Vec<(RequestId, PendingRequest)> = self.state().pending.drain().collect();
        let count = pending.len();

        for (id, request) in pending {
            if available {
                let network = NetworkHandle(id.0);
                self.state().associated = Some(format!("\"{}\"", request.ssid));
                request.callback.on_available(network);
            } else {
                request.callback.on_unavailable();
            }
        }
        count
    }

    /// Number of grant prompts issued.
    pub fn grant_requests(&self) -> usize {
        self.state().grant_requests
    }

    /// Number of scan-results queries.
    pub fn scan_queries(&self) -> usize {
        self.state().scan_queries
    }

    /// Number of scoped requests issued.
    pub fn network_requests(&self) -> usize {
        self.state().network_requests
    }

    /// Number of scoped requests released.
    pub fn released_requests(&self) -> usize {
        self.state().released_requests
    }

    /// Number of legacy disconnect calls.
    pub fn disconnect_calls(&self) -> usize {
        self.state().disconnect_calls
    }

    /// Number of legacy reconnect calls.
    pub fn reconnect_calls(&self) -> usize {
        self.state().reconnect_calls
    }

    /// Number of Wi-Fi panel prompts.
    pub fn panel_requests(&self) -> usize {
        self.state().panel_requests
    }

    /// Network the process is bound to, if any.
    pub fn bound_network(&self) -> Option<NetworkHandle> {
        self.state().bound
    }

    /// Quoted SSIDs of the stored legacy profiles.
    pub fn profiles(&self) -> Vec<String> {
        self.state().profiles.clone()
    }

    fn deliver(&self, on_thread: bool, callback: Arc<dyn NetworkCallback>, network: Option<NetworkHandle>) {
        let fire = move || match network {
            Some(network) => callback.on_available(network),
            None => callback.on_unavailable(),
        };

        if on_thread {
            std::thread::spawn(fire);
        } else {
            fire();
        }
    }
}

impl RadioFacility for SimulatedPlatform {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn is_enabled(&self) -> bool {
        self.state().radio_enabled
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), RadioError> {
        self.state().radio_enabled = enabled;
        Ok(())
    }

    fn show_wifi_panel(&self) -> Result<(), RadioError> {
        self.state().panel_requests += 1;
        Ok(())
    }

    fn scan_results(&self) -> Result<Vec<RawScanResult>, RadioError> {
        let delay = {
            let mut state = self.state();
            state.scan_queries += 1;
            state.scan_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let state = self.state();
        match &state.scan_error {
            Some(e) => Err(e.clone()),
            None => Ok(state.scan_results.clone()),
        }
    }

    fn current_associated_id(&self) -> Result<Option<String>, RadioError> {
        let state = self.state();
        match &state.associated_error {
            Some(e) => Err(e.clone()),
            None => Ok(state.associated.clone()),
        }
    }

    fn add_profile(&self, profile: &LegacyProfile) -> Result<ProfileId, RadioError> {
        let mut state = self.state();
        if state.reject_profiles {
            return Ok(-1);
        }
        state.profiles.push(profile.ssid.clone());
        Ok((state.profiles.len() - 1) as ProfileId)
    }

    fn disconnect(&self) -> Result<bool, RadioError> {
        let mut state = self.state();
        state.disconnect_calls += 1;
        Ok(state.associated.take().is_some())
    }

    fn enable_profile(&self, id: ProfileId, _disable_others: bool) -> Result<bool, RadioError> {
        let mut state = self.state();
        let known = usize::try_from(id).is_ok_and(|i| i < state.profiles.len());
        if known && state.legacy_enable_ok {
            state.enabled_profile = Some(id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn reconnect(&self) -> Result<bool, RadioError> {
        let mut state = self.state();
        state.reconnect_calls += 1;
        if !state.legacy_reconnect_ok {
            return Ok(false);
        }

        let ssid = state
            .enabled_profile
            .and_then(|id| usize::try_from(id).ok())
            .and_then(|i| state.profiles.get(i).cloned());
        match ssid {
            Some(ssid) => {
                state.associated = Some(ssid);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl ConnectivityBroker for SimulatedPlatform {
    fn request_network(
        &self,
        request: ScopedNetworkRequest,
        callback: Arc<dyn NetworkCallback>,
    ) -> Result<RequestId, RadioError> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let ssid = request.specifier.ssid;

        let (behavior, on_thread) = {
            let mut state = self.state();
            state.network_requests += 1;
            (state.scoped.clone(), state.callbacks_on_thread)
        };

        match behavior {
            ScopedBehavior::Reject(e) => return Err(e),
            ScopedBehavior::Available => {
                self.state().associated = Some(format!("\"{ssid}\""));
                self.deliver(on_thread, callback, Some(NetworkHandle(id.0)));
            }
            ScopedBehavior::Unavailable => self.deliver(on_thread, callback, None),
            ScopedBehavior::Silent => {
                self.state()
                    .pending
                    .insert(id, PendingRequest { ssid, callback });
            }
        }

        Ok(id)
    }

    fn release_request(&self, id: RequestId) -> Result<(), RadioError> {
        let mut state = self.state();
        state.pending.remove(&id);
        state.released_requests += 1;
        Ok(())
    }

    fn bind_process_to_network(&self, network: NetworkHandle) -> Result<bool, RadioError> {
        self.state().bound = Some(network);
        Ok(true)
    }
}

impl PermissionBroker for SimulatedPlatform {
    fn check_granted(&self, capability: Capabilities) -> bool {
        self.state().granted.contains(capability)
    }

    fn request_grant(&self, capabilities: Capabilities) {
        let mut state = self.state();
        state.grant_requests += 1;
        if state.grant_on_request {
            state.granted |= capabilities;
        }
    }
}
