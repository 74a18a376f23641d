use pergola_core::Bridge;
use tokio::sync::Mutex;

/// Shared application state managed by Tauri.
///
/// The bridge sits behind a `Mutex` so inbound frames and capability
/// completions are handled one at a time, in arrival order. The page's
/// message events and the native completions share one logical thread of
/// control.
pub struct AppState {
    pub bridge: Mutex<Bridge>,
}

impl AppState {
    pub fn new(bridge: Bridge) -> Self {
        Self {
            bridge: Mutex::new(bridge),
        }
    }
}
