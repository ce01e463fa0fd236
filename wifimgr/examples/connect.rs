use futures::StreamExt;
use std::sync::Arc;

use wifimgr::platform::simulated::SimulatedPlatform;
use wifimgr::{Capabilities, ConnectionState, RawScanResult, WifiManager};

#[tokio::main]
async fn main() -> wifimgr::Result<()> {
    env_logger::init();

    let ssid = std::env::var("WIFI_SSID").unwrap_or_else(|_| "HomeNet".to_string());
    let password = std::env::var("WIFI_PASSWORD").unwrap_or_else(|_| "password".to_string());

    let radio = Arc::new(SimulatedPlatform::new(33));
    radio.grant(Capabilities::all());
    radio.set_scan_results(vec![RawScanResult::new(ssid.clone(), -60)]);

    let wm = WifiManager::new(radio);

    // Print every state change while the attempt runs
    let mut updates = Box::pin(wm.connection_updates());
    let watcher = tokio::spawn(async move {
        while let Some(state) = updates.next().await {
            println!("state: {state}");
            if state.is_terminal() {
                break;
            }
        }
    });

    println!("Connecting to {ssid}...");
    match wm.connect(&ssid, &password).await {
        ConnectionState::Connected { ssid } => println!("Connected to {ssid}"),
        ConnectionState::Failed { reason } => eprintln!("{reason}"),
        other => println!("Ended in {other}"),
    }

    let _ = watcher.await;
    Ok(())
}
