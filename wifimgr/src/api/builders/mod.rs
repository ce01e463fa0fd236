//! Request builders for the two connection strategies.
//!
//! Most users should go through [`WifiManager::connect`](crate::WifiManager::connect),
//! which builds the right request for the platform. These are exposed for
//! platform implementations and for callers that want to inspect what will
//! be sent.
//!
//! # Examples
//!
//! ```rust
//! use wifimgr::CredentialAttempt;
//! use wifimgr::builders::{build_legacy_profile, build_scoped_request};
//!
//! let attempt = CredentialAttempt::new("HomeNet", "validpw");
//!
//! let scoped = build_scoped_request(&attempt).unwrap();
//! let legacy = build_legacy_profile(&attempt);
//!
//! assert_eq!(scoped.specifier.ssid, "HomeNet");
//! assert_eq!(legacy.ssid, "\"HomeNet\"");
//! ```

pub mod network_request;

pub use network_request::{
    LegacyProfile, NetworkCapabilities, NetworkSpecifier, ScopedNetworkRequest,
    ScopedRequestBuilder, Transport, build_legacy_profile, build_scoped_request,
};
