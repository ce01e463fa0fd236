/// Example demonstrating custom timeout configuration.
///
/// This shows how to shorten the wait on a scoped network request, here
/// against a platform that never answers, so the attempt times out.
use std::sync::Arc;
use std::time::Duration;

use wifimgr::platform::simulated::{ScopedBehavior, SimulatedPlatform};
use wifimgr::{Capabilities, TimeoutConfig, WifiManager};

#[tokio::main]
async fn main() -> wifimgr::Result<()> {
    env_logger::init();

    // Configure custom timeouts for a slow or unresponsive platform
    let config = TimeoutConfig::new()
        .with_scoped_request_timeout(Duration::from_secs(2)) // Give up on the request after 2s
        .with_scan_timeout(Duration::from_secs(5)); // Wait up to 5s for scan results

    let radio = Arc::new(SimulatedPlatform::new(33));
    radio.grant(Capabilities::all());
    radio.set_scoped_behavior(ScopedBehavior::Silent);

    let wm = WifiManager::with_config(radio, config);

    println!("WifiManager configured with custom timeouts:");
    println!(
        "  Scoped request timeout: {:?}",
        wm.timeout_config().scoped_request_timeout
    );
    println!("  Scan timeout: {:?}", wm.timeout_config().scan_timeout);

    println!("\nConnecting to network...");
    let state = wm.connect("MyNetwork", "password").await;
    println!("Attempt ended: {state}");

    // Default timeouts
    let wm_default = WifiManager::new(Arc::new(SimulatedPlatform::new(33)));
    println!("\nDefault WifiManager timeouts:");
    println!(
        "  Scoped request timeout: {:?}",
        wm_default.timeout_config().scoped_request_timeout
    );
    println!(
        "  Scan timeout: {:?}",
        wm_default.timeout_config().scan_timeout
    );

    Ok(())
}
