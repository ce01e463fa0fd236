use std::sync::Arc;

use wifimgr::platform::simulated::SimulatedPlatform;
use wifimgr::{RawScanResult, ScanOutcome, WifiManager, bars_from_level};

#[tokio::main]
async fn main() -> wifimgr::Result<()> {
    env_logger::init();

    let radio = Arc::new(SimulatedPlatform::new(33));
    radio.set_grant_on_request(true);
    radio.set_associated(Some("\"HomeNet\""));
    radio.set_scan_results(vec![
        RawScanResult::new("HomeNet", -52),
        RawScanResult::new("CoffeeShop", -71),
        RawScanResult::new("Library", -88),
    ]);

    let wm = WifiManager::new(radio);

    if !wm.has_required_capabilities() {
        wm.request_capabilities();
    }

    println!("Scanning for WiFi networks...");
    if let ScanOutcome::Failed(reason) = wm.start_scan().await {
        eprintln!("Scan failed: {reason}");
    }

    for net in wm.networks() {
        let marker = if net.is_associated { "*" } else { " " };
        println!("{marker} {:30} {}", net.ssid, bars_from_level(net.signal_level));
    }

    Ok(())
}
