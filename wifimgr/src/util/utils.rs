//! Utility functions for scan data conversion and display.
//!
//! Provides helpers for quantizing received signal strength, normalizing the
//! associated-network identifier reported by the platform, and rendering a
//! level as bars.

use crate::types::constants::signal;

/// Identifier the platform reports when the associated SSID is hidden from us.
const UNKNOWN_SSID: &str = "<unknown ssid>";

/// Quantizes an RSSI in dBm into `levels` discrete steps.
///
/// Anything at or below -100 dBm is level 0, anything at or above -55 dBm is
/// the top level, and values in between are mapped linearly (truncating).
/// The result is monotonic non-decreasing in `rssi`. `levels` of 0 or 1
/// always yields 0.
pub(crate) fn calculate_signal_level(rssi: i32, levels: u8) -> u8 {
    if levels <= 1 || rssi <= signal::MIN_RSSI {
        return 0;
    }
    if rssi >= signal::MAX_RSSI {
        return levels - 1;
    }

    let input_range = signal::MAX_RSSI - signal::MIN_RSSI;
    let output_range = i32::from(levels - 1);
    ((rssi - signal::MIN_RSSI) * output_range / input_range) as u8
}

/// Quantizes an RSSI onto the 5-level (0-4) scale used for observations.
pub(crate) fn signal_level(rssi: i32) -> u8 {
    calculate_signal_level(rssi, signal::LEVELS)
}

/// Normalizes the associated-network identifier reported by the platform.
///
/// Strips surrounding double quotes. Empty and placeholder identifiers are
/// treated as unknown.
pub(crate) fn normalize_ssid(raw: &str) -> Option<String> {
    let ssid = raw.trim_matches('"');
    if ssid.is_empty() || ssid == UNKNOWN_SSID {
        None
    } else {
        Some(ssid.to_string())
    }
}

/// Converts a 0-4 signal level to a visual bar representation.
///
/// - 0:   `____`
/// - 1:   `▂___`
/// - 2:   `▂▄__`
/// - 3:   `▂▄▆_`
/// - 4+:  `▂▄▆█`
pub fn bars_from_level(level: u8) -> &'static str {
    match level {
        0 => "____",
        1 => "▂___",
        2 => "▂▄__",
        3 => "▂▄▆_",
        _ => "▂▄▆█",
    }
}

/// Macro to convert Result to Option with error logging.
/// Usage: `try_log!(result, "context message")?`
#[macro_export]
macro_rules! try_log {
    ($result:expr, $context:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: {:?}", $context, e);
                return None;
            }
        }
    };
}
