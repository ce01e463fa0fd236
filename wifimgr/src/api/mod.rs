//! Public API: data models, request builders and the [`WifiManager`](crate::WifiManager) facade.

pub mod builders;
pub mod models;
pub mod wifi_manager;
