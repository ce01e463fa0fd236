//! Capability gate for radio operations.
//!
//! Every scan and connection attempt passes through [`PermissionGate::ensure`]
//! first. When a capability is missing the operation is abandoned, a grant
//! prompt is issued, and nothing else happens until the caller retries.

use log::{debug, warn};
use std::sync::Arc;

use crate::api::models::{Capabilities, PlatformProfile};
use crate::platform::PermissionBroker;

/// Checks and requests the capability set for this platform.
///
/// The required set is computed once, at construction.
#[derive(Clone)]
pub(crate) struct PermissionGate {
    broker: Arc<dyn PermissionBroker>,
    required: Capabilities,
}

impl PermissionGate {
    pub(crate) fn new(broker: Arc<dyn PermissionBroker>, platform: &PlatformProfile) -> Self {
        let required = Capabilities::required_for(platform);
        debug!("Required capabilities: {required:?}");
        Self { broker, required }
    }

    pub(crate) fn required(&self) -> Capabilities {
        self.required
    }

    /// Returns `true` when every required capability is granted.
    pub(crate) fn has_required_capabilities(&self) -> bool {
        self.required
            .iter()
            .all(|capability| self.broker.check_granted(capability))
    }

    /// Issues a grant prompt for the full required set.
    pub(crate) fn request_capabilities(&self) {
        debug!("Requesting capabilities: {:?}", self.required);
        self.broker.request_grant(self.required);
    }

    /// Returns `true` when granted; otherwise requests and returns `false`.
    pub(crate) fn ensure(&self, operation: &str) -> bool {
        if self.has_required_capabilities() {
            return true;
        }

        warn!("Capabilities missing for {operation}, requesting grant");
        self.request_capabilities();
        false
    }
}
