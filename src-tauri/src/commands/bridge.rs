use std::sync::Arc;

use crate::channel::WebviewChannel;
use crate::state::AppState;

/// Inbound frame from the page (the `ReactNativeWebView.postMessage` shim).
///
/// The bridge never fails on bad input; this command only errors if the
/// state itself is gone.
#[tauri::command]
pub async fn bridge_receive(
    raw: String,
    state: tauri::State<'_, AppState>,
) -> Result<(), String> {
    let mut bridge = state.bridge.lock().await;
    bridge.receive(&raw).await;
    Ok(())
}

/// Page finished loading: attach the live channel, flushing queued frames.
#[tauri::command]
pub async fn bridge_ready(
    window: tauri::WebviewWindow,
    state: tauri::State<'_, AppState>,
) -> Result<(), String> {
    tracing::info!("webview ready, attaching outbound channel");
    let mut bridge = state.bridge.lock().await;
    bridge.attach_channel(Arc::new(WebviewChannel::new(window)));
    Ok(())
}

/// Visible bridge error state, for the native error overlay.
#[tauri::command]
pub async fn bridge_last_error(
    state: tauri::State<'_, AppState>,
) -> Result<Option<String>, String> {
    let bridge = state.bridge.lock().await;
    Ok(bridge.last_error().map(str::to_string))
}
