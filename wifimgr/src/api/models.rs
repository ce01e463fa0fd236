use bitflags::bitflags;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::platform::{RadioError, RadioFacility};
use crate::types::constants::{api_level, battery_status, credentials, timeouts};

/// A network seen during the most recent scan.
///
/// Observations are produced fresh on every scan cycle; the whole list is
/// replaced each time, never merged with the previous one.
///
/// # Examples
///
/// ```no_run
/// use wifimgr::WifiManager;
///
/// # async fn example(wm: WifiManager) {
/// wm.start_scan().await;
/// for net in wm.networks() {
///     let marker = if net.is_associated { "*" } else { " " };
///     println!("{marker} {} ({}/4)", net.ssid, net.signal_level);
/// }
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkObservation {
    /// Network SSID (name)
    pub ssid: String,
    /// Quantized signal level (0-4)
    pub signal_level: u8,
    /// Whether this is the network the device is currently associated with
    pub is_associated: bool,
}

/// A raw scan result as reported by the radio facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawScanResult {
    /// Network SSID
    pub ssid: String,
    /// Access point MAC address, when the platform exposes it
    pub bssid: Option<String>,
    /// Received signal strength in dBm
    pub rssi: i32,
    /// Frequency in MHz
    pub frequency: Option<u32>,
}

impl RawScanResult {
    /// Creates a scan result with only the fields the orchestrator needs.
    pub fn new(ssid: impl Into<String>, rssi: i32) -> Self {
        Self {
            ssid: ssid.into(),
            bssid: None,
            rssi,
            frequency: None,
        }
    }
}

/// Connection state owned by the orchestrator.
///
/// Exactly one value is live at a time. Observers receive it through
/// [`WifiManager::subscribe_connection_state`](crate::WifiManager::subscribe_connection_state)
/// and never write it.
///
/// The lifecycle is `Idle -> Connecting -> {Connected | Failed}`. Neither
/// terminal state is final: a new `connect()` re-enters `Connecting`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection attempt has been made yet.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// Associated with the given network.
    Connected {
        /// SSID of the associated network
        ssid: String,
    },
    /// The last operation failed.
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
}

impl ConnectionState {
    /// Builds a `Failed` state whose reason is the error's display text.
    pub fn failed(err: &ConnectionError) -> Self {
        Self::Failed {
            reason: err.to_string(),
        }
    }

    /// Returns `true` for `Connected` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Connected { .. } | Self::Failed { .. })
    }

    /// Returns `true` while an attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }

    /// Returns the associated SSID, if connected.
    pub fn connected_ssid(&self) -> Option<&str> {
        match self {
            Self::Connected { ssid } => Some(ssid.as_str()),
            _ => None,
        }
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected { ssid } => write!(f, "connected to {ssid}"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Credentials for a single connection attempt.
///
/// Lives only as long as the attempt. The passphrase is held as a
/// [`SecretString`] so it never shows up in logs or `Debug` output.
#[derive(Debug)]
pub struct CredentialAttempt {
    /// Identifier used to correlate log lines of one attempt
    pub id: Uuid,
    /// Target SSID
    pub ssid: String,
    /// WPA2 passphrase, empty for open networks
    pub passphrase: SecretString,
}

impl CredentialAttempt {
    /// Creates a new attempt for `ssid`.
    pub fn new(ssid: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ssid: ssid.into(),
            passphrase: SecretString::from(passphrase.into()),
        }
    }

    /// Returns `true` when no passphrase was supplied.
    pub fn is_open(&self) -> bool {
        self.passphrase.expose_secret().is_empty()
    }

    /// Checks the SSID and passphrase against WPA2 limits.
    ///
    /// See [`validate_credentials`].
    pub fn validate(&self) -> Result<(), ConnectionError> {
        validate_credentials(&self.ssid, self.passphrase.expose_secret())
    }
}

/// Checks an SSID and passphrase against WPA2 limits.
///
/// SSIDs must be 1 to 32 bytes. Passphrases must be 8 to 63 characters, or
/// empty for an open network.
///
/// `connect()` does not enforce the passphrase limits; the platform decides
/// what it accepts. This is for callers that want to check user input before
/// handing it over.
///
/// # Examples
///
/// ```rust
/// use wifimgr::validate_credentials;
///
/// assert!(validate_credentials("HomeNet", "password").is_ok());
/// assert!(validate_credentials("HomeNet", "").is_ok());
/// assert!(validate_credentials("", "password").is_err());
/// assert!(validate_credentials("HomeNet", "short").is_err());
/// ```
pub fn validate_credentials(ssid: &str, passphrase: &str) -> Result<(), ConnectionError> {
    validate_ssid(ssid)?;

    let len = passphrase.chars().count();
    if len != 0 && !(credentials::PSK_MIN_CHARS..=credentials::PSK_MAX_CHARS).contains(&len) {
        return Err(ConnectionError::InvalidPassphrase(format!(
            "passphrase must be {} to {} characters, got {len}",
            credentials::PSK_MIN_CHARS,
            credentials::PSK_MAX_CHARS
        )));
    }

    Ok(())
}

/// Checks that an SSID is 1 to 32 bytes.
pub(crate) fn validate_ssid(ssid: &str) -> Result<(), ConnectionError> {
    if ssid.is_empty() || ssid.len() > credentials::SSID_MAX_BYTES {
        return Err(ConnectionError::InvalidSsid(format!(
            "SSID must be 1 to {} bytes, got {}",
            credentials::SSID_MAX_BYTES,
            ssid.len()
        )));
    }
    Ok(())
}

bitflags! {
    /// Runtime capabilities required for radio operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Precise location, needed to read scan results
        const FINE_LOCATION = 1 << 0;
        /// Approximate location
        const COARSE_LOCATION = 1 << 1;
        /// Nearby Wi-Fi devices (later platform revisions only)
        const NEARBY_WIFI_DEVICES = 1 << 2;
        /// Read Wi-Fi state
        const ACCESS_WIFI_STATE = 1 << 3;
        /// Change Wi-Fi state
        const CHANGE_WIFI_STATE = 1 << 4;
        /// Read network state
        const ACCESS_NETWORK_STATE = 1 << 5;
        /// Change network state
        const CHANGE_NETWORK_STATE = 1 << 6;
    }
}

impl Capabilities {
    /// Returns the capability set required on the given platform.
    pub fn required_for(platform: &PlatformProfile) -> Self {
        let base = Self::FINE_LOCATION
            | Self::COARSE_LOCATION
            | Self::ACCESS_WIFI_STATE
            | Self::CHANGE_WIFI_STATE
            | Self::ACCESS_NETWORK_STATE
            | Self::CHANGE_NETWORK_STATE;

        if platform.requires_nearby_devices() {
            base | Self::NEARBY_WIFI_DEVICES
        } else {
            base
        }
    }
}

/// Static description of what the host platform supports.
///
/// Computed once at startup and never re-evaluated; every version-dependent
/// decision in the crate goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    /// Platform API level
    pub api_level: u32,
}

impl PlatformProfile {
    /// Creates a profile for the given API level.
    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    /// Reads the API level from the radio facility.
    pub fn detect(radio: &dyn RadioFacility) -> Self {
        Self::new(radio.api_level())
    }

    /// Whether one-shot scoped network requests are available.
    pub fn supports_scoped_requests(&self) -> bool {
        self.api_level >= api_level::SCOPED_REQUESTS
    }

    /// Whether the nearby-devices capability is part of the required set.
    pub fn requires_nearby_devices(&self) -> bool {
        self.api_level >= api_level::NEARBY_DEVICES
    }
}

/// Timeout configuration for orchestrator operations.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use wifimgr::TimeoutConfig;
///
/// let config = TimeoutConfig::new()
///     .with_scoped_request_timeout(Duration::from_secs(60))
///     .with_scan_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.scoped_request_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// How long a scoped network request may stay pending
    pub scoped_request_timeout: Duration,
    /// How long the blocking scan-results query may take
    pub scan_timeout: Duration,
}

impl TimeoutConfig {
    /// Creates a configuration with default timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scoped request timeout.
    pub fn with_scoped_request_timeout(mut self, timeout: Duration) -> Self {
        self.scoped_request_timeout = timeout;
        self
    }

    /// Sets the scan query timeout.
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            scoped_request_timeout: timeouts::scoped_request_timeout(),
            scan_timeout: timeouts::scan_timeout(),
        }
    }
}

/// Result of a `start_scan()` call.
///
/// Failures are also reflected in the observable state; this value only
/// lets callers tell what happened without subscribing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The network list was replaced with this many observations.
    Updated(usize),
    /// Capabilities were missing; a grant request was issued instead.
    PermissionRequested,
    /// Another scan was already in flight.
    Busy,
    /// The query was refused for lack of permission.
    PermissionDenied,
    /// The query failed for another reason; the list is unchanged.
    Failed(String),
}

/// Battery charge status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeStatus {
    /// Status not reported.
    Unknown,
    /// Charging.
    Charging,
    /// Discharging.
    Discharging,
    /// Plugged in but not charging.
    NotCharging,
    /// Fully charged.
    Full,
}

impl From<i32> for ChargeStatus {
    fn from(code: i32) -> Self {
        match code {
            battery_status::CHARGING => Self::Charging,
            battery_status::DISCHARGING => Self::Discharging,
            battery_status::NOT_CHARGING => Self::NotCharging,
            battery_status::FULL => Self::Full,
            battery_status::UNKNOWN => Self::Unknown,
            _ => Self::Unknown,
        }
    }
}

impl Display for ChargeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Charging => write!(f, "charging"),
            Self::Discharging => write!(f, "discharging"),
            Self::NotCharging => write!(f, "not charging"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Raw battery reading as delivered by the platform power broadcast.
///
/// Missing fields are reported as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    /// Current charge level in `scale` units
    pub level: i32,
    /// Maximum value of `level`
    pub scale: i32,
    /// Raw status code
    pub status: i32,
}

/// Power-source telemetry derived from a [`BatteryReading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSnapshot {
    /// Charge percentage, `None` when the reading was incomplete
    pub percent: Option<u8>,
    /// Charge status
    pub charge_status: ChargeStatus,
}

impl PowerSnapshot {
    /// Returns `true` when the device is charging or full.
    pub fn is_charging(&self) -> bool {
        matches!(
            self.charge_status,
            ChargeStatus::Charging | ChargeStatus::Full
        )
    }
}

impl From<BatteryReading> for PowerSnapshot {
    fn from(reading: BatteryReading) -> Self {
        let percent = if reading.level < 0 || reading.scale <= 0 {
            None
        } else {
            let pct = i64::from(reading.level) * 100 / i64::from(reading.scale);
            Some(pct.clamp(0, 100) as u8)
        };

        Self {
            percent,
            charge_status: ChargeStatus::from(reading.status),
        }
    }
}

/// Errors that can occur during Wi-Fi operations.
///
/// The display text of each variant is the reason carried by
/// [`ConnectionState::Failed`], so it is written for end users.
///
/// # Examples
///
/// ```rust
/// use wifimgr::{ConnectionError, ConnectionState};
///
/// let err = ConnectionError::AssociationFailed("HomeNet".into());
/// assert_eq!(
///     ConnectionState::failed(&err),
///     ConnectionState::Failed {
///         reason: "Failed to connect to HomeNet. Please check the password and try again.".into()
///     }
/// );
/// ```
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The required capability set is not granted.
    #[error("Required permissions not granted. Please grant Wi-Fi and location permissions.")]
    PermissionsNotGranted,

    /// The scan-results query was refused for lack of permission.
    #[error("Permission denied for Wi-Fi scan")]
    ScanPermissionDenied,

    /// The scoped request reported the network as unavailable.
    #[error("Failed to connect to {0}. Please check the password and try again.")]
    AssociationFailed(String),

    /// The legacy enable/reconnect sequence reported failure.
    #[error("Failed to connect to {0}")]
    LegacyConnectFailed(String),

    /// The scoped request did not resolve in time.
    #[error("Timed out waiting for {0} to become available")]
    Timeout(String),

    /// Any other error raised while executing a strategy.
    #[error("Error connecting to network: {0}")]
    Unexpected(String),

    /// The SSID is empty or too long.
    #[error("invalid SSID: {0}")]
    InvalidSsid(String),

    /// The passphrase length is out of range.
    #[error("invalid passphrase: {0}")]
    InvalidPassphrase(String),

    /// A platform collaborator returned an error.
    #[error("radio error: {0}")]
    Radio(#[from] RadioError),

    /// The manager was built without a required facility.
    #[error("incomplete configuration: {0}")]
    Config(String),
}

impl ConnectionError {
    /// Wraps this error as the catch-all strategy failure, unless it
    /// already is one of the outcome variants.
    pub(crate) fn into_strategy_failure(self) -> Self {
        match self {
            Self::AssociationFailed(_)
            | Self::LegacyConnectFailed(_)
            | Self::Timeout(_)
            | Self::Unexpected(_) => self,
            other => Self::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_state_defaults_to_idle() {
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[test]
    fn connection_state_terminal_variants() {
        assert!(!ConnectionState::Idle.is_terminal());
        assert!(!ConnectionState::Connecting.is_terminal());
        assert!(ConnectionState::Connected { ssid: "a".into() }.is_terminal());
        assert!(ConnectionState::Failed { reason: "x".into() }.is_terminal());
    }

    #[test]
    fn connection_state_display() {
        assert_eq!(format!("{}", ConnectionState::Idle), "idle");
        assert_eq!(
            format!("{}", ConnectionState::Connected { ssid: "Home".into() }),
            "connected to Home"
        );
    }

    #[test]
    fn failed_state_uses_error_text() {
        let state = ConnectionState::failed(&ConnectionError::PermissionsNotGranted);
        match state {
            ConnectionState::Failed { reason } => {
                assert!(reason.starts_with("Required permissions not granted"))
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConnectionError::ScanPermissionDenied.to_string(),
            "Permission denied for Wi-Fi scan"
        );
        assert_eq!(
            ConnectionError::LegacyConnectFailed("HomeNet".into()).to_string(),
            "Failed to connect to HomeNet"
        );
        assert_eq!(
            ConnectionError::Unexpected("boom".into()).to_string(),
            "Error connecting to network: boom"
        );
    }

    #[test]
    fn strategy_failure_wraps_other_errors() {
        let err = ConnectionError::InvalidSsid("empty".into()).into_strategy_failure();
        assert_eq!(
            err.to_string(),
            "Error connecting to network: invalid SSID: empty"
        );

        let err = ConnectionError::AssociationFailed("x".into()).into_strategy_failure();
        assert!(matches!(err, ConnectionError::AssociationFailed(_)));
    }

    #[test]
    fn credential_validation() {
        assert!(CredentialAttempt::new("HomeNet", "validpw1").validate().is_ok());
        assert!(CredentialAttempt::new("OpenCafe", "").validate().is_ok());
        assert!(CredentialAttempt::new("a".repeat(32), "").validate().is_ok());

        assert!(matches!(
            CredentialAttempt::new("", "validpw1").validate(),
            Err(ConnectionError::InvalidSsid(_))
        ));
        assert!(matches!(
            CredentialAttempt::new("a".repeat(33), "").validate(),
            Err(ConnectionError::InvalidSsid(_))
        ));
        assert!(matches!(
            CredentialAttempt::new("HomeNet", "short").validate(),
            Err(ConnectionError::InvalidPassphrase(_))
        ));
        assert!(matches!(
            CredentialAttempt::new("HomeNet", "a".repeat(64)).validate(),
            Err(ConnectionError::InvalidPassphrase(_))
        ));
    }

    #[test]
    fn credential_debug_redacts_passphrase() {
        let attempt = CredentialAttempt::new("HomeNet", "supersecret");
        let dbg = format!("{attempt:?}");
        assert!(!dbg.contains("supersecret"));
    }

    #[test]
    fn required_capabilities_depend_on_platform() {
        let legacy = Capabilities::required_for(&PlatformProfile::new(28));
        let modern = Capabilities::required_for(&PlatformProfile::new(33));

        assert!(!legacy.contains(Capabilities::NEARBY_WIFI_DEVICES));
        assert!(modern.contains(Capabilities::NEARBY_WIFI_DEVICES));
        assert_eq!(modern - Capabilities::NEARBY_WIFI_DEVICES, legacy);
    }

    #[test]
    fn platform_profile_thresholds() {
        assert!(!PlatformProfile::new(28).supports_scoped_requests());
        assert!(PlatformProfile::new(29).supports_scoped_requests());
        assert!(!PlatformProfile::new(30).requires_nearby_devices());
        assert!(PlatformProfile::new(31).requires_nearby_devices());
    }

    #[test]
    fn power_snapshot_from_reading() {
        let snap = PowerSnapshot::from(BatteryReading {
            level: 57,
            scale: 100,
            status: 2,
        });
        assert_eq!(snap.percent, Some(57));
        assert!(snap.is_charging());

        let snap = PowerSnapshot::from(BatteryReading {
            level: 1,
            scale: 3,
            status: 5,
        });
        assert_eq!(snap.percent, Some(33));
        assert_eq!(snap.charge_status, ChargeStatus::Full);
        assert!(snap.is_charging());

        let snap = PowerSnapshot::from(BatteryReading {
            level: -1,
            scale: -1,
            status: -1,
        });
        assert_eq!(snap.percent, None);
        assert_eq!(snap.charge_status, ChargeStatus::Unknown);
        assert!(!snap.is_charging());
    }

    #[test]
    fn charge_status_from_code() {
        assert_eq!(ChargeStatus::from(3), ChargeStatus::Discharging);
        assert_eq!(ChargeStatus::from(4), ChargeStatus::NotCharging);
        assert_eq!(ChargeStatus::from(99), ChargeStatus::Unknown);
        assert_eq!(format!("{}", ChargeStatus::NotCharging), "not charging");
    }

    #[test]
    fn timeout_config_builder() {
        let cfg = TimeoutConfig::new().with_scan_timeout(Duration::from_millis(5));
        assert_eq!(cfg.scan_timeout, Duration::from_millis(5));
        assert_eq!(cfg.scoped_request_timeout, Duration::from_secs(30));
    }
}
