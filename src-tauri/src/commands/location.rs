use crate::state::AppState;

/// Native GPS toggle (the shell's own on/off control).
#[tauri::command]
pub async fn location_set_enabled(
    enabled: bool,
    state: tauri::State<'_, AppState>,
) -> Result<(), String> {
    let mut bridge = state.bridge.lock().await;
    bridge.set_location_enabled(enabled).await;
    Ok(())
}

/// Whether the location toggle is on, for the native status line.
#[tauri::command]
pub async fn location_enabled(state: tauri::State<'_, AppState>) -> Result<bool, String> {
    let bridge = state.bridge.lock().await;
    Ok(bridge.is_location_enabled())
}
