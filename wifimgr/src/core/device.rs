//! Wi-Fi radio power control.
//!
//! Scoped-request platforms do not let applications switch the radio on;
//! the best we can do there is ask the platform to show its Wi-Fi panel
//! and let the user decide. Legacy platforms accept the switch directly.

use log::{debug, info};

use crate::Result;
use crate::api::models::PlatformProfile;
use crate::platform::RadioFacility;

/// Returns whether the Wi-Fi radio is on.
pub(crate) fn wifi_enabled(radio: &dyn RadioFacility) -> bool {
    radio.is_enabled()
}

/// Switches the radio on, or prompts the user where that is not allowed.
pub(crate) fn enable_wifi(radio: &dyn RadioFacility, platform: &PlatformProfile) -> Result<()> {
    if radio.is_enabled() {
        debug!("Wi-Fi already enabled");
        return Ok(());
    }

    if platform.supports_scoped_requests() {
        info!("Opening Wi-Fi settings panel");
        radio.show_wifi_panel()?;
    } else {
        info!("Enabling Wi-Fi radio");
        radio.set_enabled(true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::simulated::SimulatedPlatform;

    #[test]
    fn legacy_platform_enables_directly() {
        let radio = SimulatedPlatform::new(28);
        radio.set_radio_enabled(false);

        enable_wifi(&radio, &PlatformProfile::new(28)).unwrap();
        assert!(wifi_enabled(&radio));
        assert_eq!(radio.panel_requests(), 0);
    }

    #[test]
    fn modern_platform_opens_panel() {
        let radio = SimulatedPlatform::new(33);
        radio.set_radio_enabled(false);

        enable_wifi(&radio, &PlatformProfile::new(33)).unwrap();
        assert!(!wifi_enabled(&radio));
        assert_eq!(radio.panel_requests(), 1);
    }

    #[test]
    fn already_enabled_is_noop() {
        let radio = SimulatedPlatform::new(33);
        enable_wifi(&radio, &PlatformProfile::new(33)).unwrap();
        assert_eq!(radio.panel_requests(), 0);
    }
}
