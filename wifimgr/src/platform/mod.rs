//! Platform collaborator interfaces.
//!
//! The orchestrator never reaches for a global radio handle. Everything it
//! needs from the host is expressed by the three traits in this module and
//! injected through [`WifiManagerBuilder`](crate::WifiManagerBuilder):
//!
//! - [`RadioFacility`] - radio power, scan results, association identity and
//!   the legacy profile calls
//! - [`ConnectivityBroker`] - scoped network requests and process binding
//! - [`PermissionBroker`] - capability checks and grant prompts
//!
//! Radio and permission calls may block; the orchestrator only invokes the
//! blocking ones from a worker thread. Callbacks registered with the
//! connectivity broker may fire on any thread.
//!
//! [`simulated::SimulatedPlatform`] implements all three in memory.

pub mod simulated;

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

use crate::api::builders::{LegacyProfile, ScopedNetworkRequest};
use crate::api::models::{Capabilities, RawScanResult};

/// Errors reported by platform collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadioError {
    /// The caller lacks a capability for this call.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The radio or broker is not available.
    #[error("radio unavailable: {0}")]
    Unavailable(String),

    /// Any other platform failure.
    #[error("{0}")]
    Failed(String),
}

/// Identifier of a profile stored by the legacy configuration API.
pub type ProfileId = i32;

/// Opaque handle to a network delivered by a scoped request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkHandle(pub u64);

impl Display for NetworkHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "network#{}", self.0)
    }
}

/// Identifier of an outstanding scoped network request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "request#{}", self.0)
    }
}

/// Radio management facility.
pub trait RadioFacility: Send + Sync {
    /// Platform API level.
    fn api_level(&self) -> u32;

    /// Whether the Wi-Fi radio is switched on.
    fn is_enabled(&self) -> bool;

    /// Switches the radio on or off. Only honoured on legacy platforms.
    fn set_enabled(&self, enabled: bool) -> Result<(), RadioError>;

    /// Asks the platform to show its Wi-Fi settings panel.
    fn show_wifi_panel(&self) -> Result<(), RadioError>;

    /// Returns the results of the most recent platform scan. Blocking.
    fn scan_results(&self) -> Result<Vec<RawScanResult>, RadioError>;

    /// Returns the identifier of the associated network, possibly quoted.
    fn current_associated_id(&self) -> Result<Option<String>, RadioError>;

    /// Stores a legacy network profile and returns its id. Blocking.
    fn add_profile(&self, profile: &LegacyProfile) -> Result<ProfileId, RadioError>;

    /// Drops the current association. Blocking.
    fn disconnect(&self) -> Result<bool, RadioError>;

    /// Enables a stored profile, optionally disabling all others. Blocking.
    fn enable_profile(&self, id: ProfileId, disable_others: bool) -> Result<bool, RadioError>;

    /// Forces reassociation. Blocking.
    fn reconnect(&self) -> Result<bool, RadioError>;
}

/// Receives the terminal outcome of a scoped network request.
///
/// Implementations must tolerate being invoked on any thread, more than
/// once, and after the requester stopped waiting.
pub trait NetworkCallback: Send + Sync {
    /// The requested network is available.
    fn on_available(&self, network: NetworkHandle);

    /// The requested network could not be provided.
    fn on_unavailable(&self);
}

/// Connectivity broker facility.
pub trait ConnectivityBroker: Send + Sync {
    /// Issues a scoped network request. Returns immediately; the outcome is
    /// delivered later through `callback`.
    fn request_network(
        &self,
        request: ScopedNetworkRequest,
        callback: Arc<dyn NetworkCallback>,
    ) -> Result<RequestId, RadioError>;

    /// Withdraws an outstanding request.
    fn release_request(&self, id: RequestId) -> Result<(), RadioError>;

    /// Routes the process's default traffic through `network`.
    fn bind_process_to_network(&self, network: NetworkHandle) -> Result<bool, RadioError>;
}

/// Permission broker facility.
pub trait PermissionBroker: Send + Sync {
    /// Whether every capability in `capability` is granted.
    fn check_granted(&self, capability: Capabilities) -> bool;

    /// Prompts for the given capabilities. The outcome is not reported back.
    fn request_grant(&self, capabilities: Capabilities);
}
