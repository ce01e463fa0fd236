//! Observable state store.
//!
//! Holds the two values observers care about, the discovered-network list and
//! the connection state, each in its own `tokio::sync::watch` channel:
//!
//! - the latest value is cached and handed to every new subscriber
//! - any number of subscribers may observe at once
//! - writers never wait on readers; a slow reader only sees the most recent
//!   value (intermediate ones are conflated)
//! - every update replaces the whole value
//!
//! The watch sender serializes writers, so updates may come from any thread,
//! including platform callback threads.

use futures::stream::{self, Stream};
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;

use crate::api::models::{ConnectionState, NetworkObservation};

#[derive(Debug)]
struct Channels {
    networks: watch::Sender<Vec<NetworkObservation>>,
    connection: watch::Sender<ConnectionState>,
}

/// Shared store for the network list and the connection state.
///
/// Cloning is cheap; clones share the same channels.
#[derive(Debug, Clone)]
pub struct StateStore {
    inner: Arc<Channels>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Creates a store with an empty network list and `Idle` state.
    pub fn new() -> Self {
        let (networks, _) = watch::channel(Vec::new());
        let (connection, _) = watch::channel(ConnectionState::Idle);
        Self {
            inner: Arc::new(Channels {
                networks,
                connection,
            }),
        }
    }

    /// Returns a snapshot of the current network list.
    pub fn networks(&self) -> Vec<NetworkObservation> {
        self.inner.networks.borrow().clone()
    }

    /// Returns the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.connection.borrow().clone()
    }

    /// Subscribes to network list updates.
    pub fn subscribe_networks(&self) -> watch::Receiver<Vec<NetworkObservation>> {
        self.inner.networks.subscribe()
    }

    /// Subscribes to connection state updates.
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    /// Network list as a stream, starting with the current value.
    pub fn network_updates(&self) -> impl Stream<Item = Vec<NetworkObservation>> + use<> {
        watch_stream(self.subscribe_networks())
    }

    /// Connection state as a stream, starting with the current value.
    pub fn connection_updates(&self) -> impl Stream<Item = ConnectionState> + use<> {
        watch_stream(self.subscribe_connection())
    }

    /// Replaces the whole network list.
    pub(crate) fn replace_networks(&self, networks: Vec<NetworkObservation>) {
        debug!("Publishing {} network observations", networks.len());
        self.inner.networks.send_replace(networks);
    }

    /// Replaces the connection state.
    pub(crate) fn transition(&self, next: ConnectionState) {
        let previous = self.inner.connection.send_replace(next.clone());
        debug!("Connection state: {previous} -> {next}");
    }
}

/// Turns a watch receiver into a stream that yields the current value first,
/// then every subsequent change, and ends when the sender is dropped.
fn watch_stream<T>(rx: watch::Receiver<T>) -> impl Stream<Item = T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let value = rx.borrow_and_update().clone();
        Some((value, (rx, false)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn obs(ssid: &str, level: u8) -> NetworkObservation {
        NetworkObservation {
            ssid: ssid.into(),
            signal_level: level,
            is_associated: false,
        }
    }

    #[test]
    fn starts_idle_and_empty() {
        let store = StateStore::new();
        assert_eq!(store.connection_state(), ConnectionState::Idle);
        assert!(store.networks().is_empty());
    }

    #[test]
    fn new_subscriber_sees_latest_value() {
        let store = StateStore::new();
        store.transition(ConnectionState::Connected {
            ssid: "HomeNet".into(),
        });

        let rx = store.subscribe_connection();
        assert_eq!(
            *rx.borrow(),
            ConnectionState::Connected {
                ssid: "HomeNet".into()
            }
        );
    }

    #[test]
    fn replace_networks_is_total() {
        let store = StateStore::new();
        store.replace_networks(vec![obs("a", 1), obs("b", 2)]);
        store.replace_networks(vec![obs("c", 3)]);
        assert_eq!(store.networks(), vec![obs("c", 3)]);
    }

    #[tokio::test]
    async fn slow_observer_is_conflated() {
        let store = StateStore::new();
        let mut rx = store.subscribe_connection();

        store.transition(ConnectionState::Connecting);
        store.transition(ConnectionState::Failed { reason: "a".into() });
        store.transition(ConnectionState::Connected { ssid: "b".into() });

        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            ConnectionState::Connected { ssid: "b".into() }
        );
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn stream_replays_current_then_changes() {
        let store = StateStore::new();
        store.replace_networks(vec![obs("a", 1)]);

        let mut updates = Box::pin(store.network_updates());
        assert_eq!(updates.next().await, Some(vec![obs("a", 1)]));

        store.replace_networks(vec![obs("b", 2)]);
        assert_eq!(updates.next().await, Some(vec![obs("b", 2)]));
    }
}
