//! Waiting for a scoped network request to resolve.
//!
//! The connectivity broker reports the outcome of a scoped request through a
//! callback that may run on any thread, possibly more than once.
//! [`OneShotCallback`] turns that into a single-shot channel: the first
//! outcome is forwarded, later ones are dropped. The orchestrator then awaits
//! the channel with a timeout, so the state store is only ever written from
//! the awaiting task.

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::pin::pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::Result;
use crate::api::models::ConnectionError;
use crate::platform::{NetworkCallback, NetworkHandle};

/// Terminal outcome of a scoped request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Availability {
    Available(NetworkHandle),
    Unavailable,
}

/// Callback that forwards the first outcome it receives.
pub(crate) struct OneShotCallback {
    tx: Mutex<Option<oneshot::Sender<Availability>>>,
}

impl OneShotCallback {
    pub(crate) fn channel() -> (Arc<Self>, oneshot::Receiver<Availability>) {
        let (tx, rx) = oneshot::channel();
        let callback = Arc::new(Self {
            tx: Mutex::new(Some(tx)),
        });
        (callback, rx)
    }

    fn deliver(&self, outcome: Availability) {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                if tx.send(outcome).is_err() {
                    debug!("Requester stopped waiting, dropping {outcome:?}");
                }
            }
            None => debug!("Ignoring repeated network callback: {outcome:?}"),
        }
    }
}

impl NetworkCallback for OneShotCallback {
    fn on_available(&self, network: NetworkHandle) {
        self.deliver(Availability::Available(network));
    }

    fn on_unavailable(&self) {
        self.deliver(Availability::Unavailable);
    }
}

/// Waits for the scoped request for `ssid` to resolve.
///
/// Returns the network handle on success, `AssociationFailed` when the
/// network is unavailable, and `Timeout` when nothing arrives in time.
pub(crate) async fn wait_for_availability(
    rx: oneshot::Receiver<Availability>,
    ssid: &str,
    timeout: Duration,
) -> Result<NetworkHandle> {
    let mut timeout_delay = pin!(Delay::new(timeout).fuse());

    select! {
        outcome = rx.fuse() => match outcome {
            Ok(Availability::Available(network)) => {
                debug!("Scoped request for '{ssid}' resolved to {network}");
                Ok(network)
            }
            Ok(Availability::Unavailable) => {
                debug!("Scoped request for '{ssid}' reported unavailable");
                Err(ConnectionError::AssociationFailed(ssid.to_string()))
            }
            Err(_) => {
                warn!("Network callback for '{ssid}' was dropped without an outcome");
                Err(ConnectionError::Unexpected("network callback dropped".into()))
            }
        },
        _ = timeout_delay => {
            warn!("Scoped request for '{ssid}' timed out after {timeout:?}");
            Err(ConnectionError::Timeout(ssid.to_string()))
        }
    }
}
