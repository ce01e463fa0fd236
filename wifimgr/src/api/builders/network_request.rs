//! Scoped request and legacy profile builders.
//!
//! Constructs the two request shapes the platform accepts for joining a
//! network:
//!
//! - a [`ScopedNetworkRequest`]: a one-shot request for a single network
//!   matching a specifier, which never changes the device's default network
//!   preference
//! - a [`LegacyProfile`]: a persisted configuration entry for the legacy
//!   configuration API, which expects quoted SSID and key strings

use bitflags::bitflags;
use secrecy::{ExposeSecret, SecretString};

use crate::Result;
use crate::api::models::{CredentialAttempt, validate_ssid};

bitflags! {
    /// Capability filter attached to a scoped network request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NetworkCapabilities: u32 {
        /// Network provides internet access
        const INTERNET = 1 << 0;
        /// Network is usable by regular apps
        const NOT_RESTRICTED = 1 << 1;
        /// Network is trusted by the user
        const TRUSTED = 1 << 2;
    }
}

/// Transport requested for a scoped network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Wi-Fi transport
    Wifi,
}

/// Identifies the single network a scoped request is for.
#[derive(Debug)]
pub struct NetworkSpecifier {
    /// Target SSID
    pub ssid: String,
    /// WPA2 passphrase, `None` for open networks
    pub passphrase: Option<SecretString>,
}

/// A one-shot request for one specific network.
#[derive(Debug)]
pub struct ScopedNetworkRequest {
    /// Required transport
    pub transport: Transport,
    /// Required network capabilities
    pub capabilities: NetworkCapabilities,
    /// The network being asked for
    pub specifier: NetworkSpecifier,
}

/// Builder for [`ScopedNetworkRequest`].
///
/// # Examples
///
/// ```rust
/// use wifimgr::builders::{NetworkCapabilities, ScopedRequestBuilder};
///
/// let request = ScopedRequestBuilder::new("HomeNet")
///     .wpa2_passphrase("hunter22")
///     .capability(NetworkCapabilities::TRUSTED)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.specifier.ssid, "HomeNet");
/// ```
#[derive(Debug)]
pub struct ScopedRequestBuilder {
    ssid: String,
    passphrase: Option<SecretString>,
    capabilities: NetworkCapabilities,
}

impl ScopedRequestBuilder {
    /// Creates a builder for an open network with no capability filter.
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: None,
            capabilities: NetworkCapabilities::empty(),
        }
    }

    /// Sets a WPA2 passphrase.
    pub fn wpa2_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(SecretString::from(passphrase.into()));
        self
    }

    /// Adds a required capability.
    pub fn capability(mut self, capability: NetworkCapabilities) -> Self {
        self.capabilities |= capability;
        self
    }

    /// Checks the SSID and produces the request.
    ///
    /// The passphrase is passed through as given; its limits are the
    /// platform's to enforce.
    pub fn build(self) -> Result<ScopedNetworkRequest> {
        validate_ssid(&self.ssid)?;

        Ok(ScopedNetworkRequest {
            transport: Transport::Wifi,
            capabilities: self.capabilities,
            specifier: NetworkSpecifier {
                ssid: self.ssid,
                passphrase: self.passphrase,
            },
        })
    }
}

/// Builds the scoped request issued for a connection attempt.
///
/// The request asks for a trusted, unrestricted Wi-Fi network matching the
/// attempt's SSID and passphrase.
pub fn build_scoped_request(attempt: &CredentialAttempt) -> Result<ScopedNetworkRequest> {
    let mut builder = ScopedRequestBuilder::new(attempt.ssid.clone())
        .capability(NetworkCapabilities::NOT_RESTRICTED)
        .capability(NetworkCapabilities::TRUSTED);

    if !attempt.is_open() {
        builder = builder.wpa2_passphrase(attempt.passphrase.expose_secret());
    }

    builder.build()
}

/// A network profile for the legacy configuration API.
///
/// Both fields are stored wrapped in double quotes.
#[derive(Debug)]
pub struct LegacyProfile {
    /// Quoted SSID
    pub ssid: String,
    /// Quoted pre-shared key, `None` for open networks
    pub pre_shared_key: Option<SecretString>,
}

impl LegacyProfile {
    /// Returns the SSID without the surrounding quotes.
    pub fn unquoted_ssid(&self) -> &str {
        self.ssid.trim_matches('"')
    }
}

/// Builds the legacy profile for a connection attempt.
///
/// Nothing is validated here. The legacy API reports a profile it cannot
/// use by refusing to store it.
pub fn build_legacy_profile(attempt: &CredentialAttempt) -> LegacyProfile {
    let pre_shared_key = if attempt.is_open() {
        None
    } else {
        Some(SecretString::from(quote(attempt.passphrase.expose_secret())))
    };

    LegacyProfile {
        ssid: quote(&attempt.ssid),
        pre_shared_key,
    }
}

fn quote(s: &str) -> String {
    format!("\"{s}\"")
}
