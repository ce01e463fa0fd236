//! A Rust library for orchestrating Wi-Fi scans and connections over an
//! injected platform radio.
//!
//! This crate provides a high-level async API for the common operations of a
//! Wi-Fi client:
//!
//! - Scanning and publishing the visible networks with quantized signal levels
//! - Connecting to open and WPA2-PSK networks
//! - Tracking the connection state machine as an observable value
//! - Checking and requesting the capabilities radio operations need
//!
//! The host platform is never reached directly. Radio management, network
//! requests and permission prompts are traits in [`platform`], supplied when
//! the [`WifiManager`] is built. [`platform::simulated::SimulatedPlatform`]
//! implements all of them in memory.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifimgr::{Capabilities, ConnectionState, RawScanResult, WifiManager};
//! use wifimgr::platform::simulated::SimulatedPlatform;
//!
//! # async fn example() {
//! let radio = Arc::new(SimulatedPlatform::new(33));
//! radio.grant(Capabilities::all());
//! radio.set_scan_results(vec![RawScanResult::new("HomeNet", -60)]);
//!
//! let wm = WifiManager::new(radio);
//!
//! // List visible networks
//! wm.start_scan().await;
//! for net in wm.networks() {
//!     println!("{} {}", net.ssid, wifimgr::bars_from_level(net.signal_level));
//! }
//!
//! // Connect to a network
//! if let ConnectionState::Failed { reason } = wm.connect("HomeNet", "validpw").await {
//!     eprintln!("{reason}");
//! }
//! # }
//! ```
//!
//! # Error Handling
//!
//! Scan and connect never return `Err`. Every failure they meet is published
//! as [`ConnectionState::Failed`] with a human-readable reason, which is the
//! `Display` text of the matching [`ConnectionError`] variant. Operations
//! that can fail for configuration reasons, such as building the manager or
//! enabling the radio, return `Result<T, ConnectionError>`.
//!
//! # Callback-Based Connection Tracking
//!
//! On platforms with scoped network requests, a connection attempt issues a
//! single request and awaits the broker's callback instead of polling the
//! association. The callback may fire on any thread; the first outcome wins
//! and later ones are ignored. A request that never resolves is released
//! after [`TimeoutConfig::scoped_request_timeout`].
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:

//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod monitoring;
mod types;
mod util;

// Public API modules
pub mod api;
pub mod platform;

pub use api::builders;

// Re-exported public API
pub use api::models::{
    BatteryReading, Capabilities, ChargeStatus, ConnectionError, ConnectionState,
    CredentialAttempt, NetworkObservation, PlatformProfile, PowerSnapshot, RawScanResult,
    ScanOutcome, TimeoutConfig, validate_credentials,
};
pub use api::wifi_manager::{WifiManager, WifiManagerBuilder};
pub use monitoring::power::PowerMonitor;
pub use monitoring::state::StateStore;
pub use util::utils::bars_from_level;

/// A specialized `Result` type for Wi-Fi operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;
