//! Constants for platform radio values.
//!
//! These constants mirror the numeric conventions used by the platform
//! radio and connectivity facilities: API levels, RSSI bounds, battery
//! status codes and timeout defaults.

/// Platform API levels that gate behaviour.
pub mod api_level {
    /// First API level offering scoped (one-shot) network requests.
    pub const SCOPED_REQUESTS: u32 = 29;
    /// First API level requiring the nearby-devices capability for radio work.
    pub const NEARBY_DEVICES: u32 = 31;
}

/// Signal quantization constants.
pub mod signal {
    /// Any RSSI at or below this value maps to level 0.
    pub const MIN_RSSI: i32 = -100;
    /// Any RSSI at or above this value maps to the top level.
    pub const MAX_RSSI: i32 = -55;
    /// Number of discrete levels reported for a scan result (0..=4).
    pub const LEVELS: u8 = 5;
}

/// SSID and passphrase limits
pub mod credentials {
    pub const SSID_MAX_BYTES: usize = 32;
    pub const PSK_MIN_CHARS: usize = 8;
    pub const PSK_MAX_CHARS: usize = 63;
}

/// Battery status codes as delivered by the power broadcast.
pub mod battery_status {
    pub const UNKNOWN: i32 = 1;
    pub const CHARGING: i32 = 2;
    pub const DISCHARGING: i32 = 3;
    pub const NOT_CHARGING: i32 = 4;
    pub const FULL: i32 = 5;
}

/// Default timeouts.
///
/// The platform gives no bound on how long a scoped request may stay
/// pending, so the orchestrator imposes its own.
pub mod timeouts {
    use std::time::Duration;

    /// Maximum time to wait for a scoped network request to resolve (30 seconds).
    const SCOPED_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Maximum time a blocking scan-results query may take (10 seconds).
    const SCAN_TIMEOUT_SECS: u64 = 10;

    /// Returns the scoped request timeout duration.
    pub fn scoped_request_timeout() -> Duration {
        Duration::from_secs(SCOPED_REQUEST_TIMEOUT_SECS)
    }

    /// Returns the scan query timeout duration.
    pub fn scan_timeout() -> Duration {
        Duration::from_secs(SCAN_TIMEOUT_SECS)
    }
}
