use pergola_core::capability::camera::{decode_photo_data, Orientation};

use crate::state::AppState;

/// Capture UI finished a frame (base64 or data URL). Persists it and
/// announces the result to the page.
#[tauri::command]
pub async fn camera_capture(
    frame: String,
    state: tauri::State<'_, AppState>,
) -> Result<(), String> {
    let bytes = decode_photo_data(&frame).map_err(|e| e.to_string())?;
    let mut bridge = state.bridge.lock().await;
    bridge.complete_capture(&bytes).await;
    Ok(())
}

/// Flip the lens. Returns the new facing ("back" / "front").
#[tauri::command]
pub async fn camera_toggle_facing(
    state: tauri::State<'_, AppState>,
) -> Result<String, String> {
    let mut bridge = state.bridge.lock().await;
    Ok(bridge.camera_mut().toggle_facing().as_str().to_string())
}

/// Capture UI reported a new orientation.
#[tauri::command]
pub async fn camera_set_orientation(
    orientation: String,
    state: tauri::State<'_, AppState>,
) -> Result<(), String> {
    let orientation = match orientation.as_str() {
        "portrait" => Orientation::Portrait,
        "portraitUpsideDown" => Orientation::PortraitUpsideDown,
        "landscapeLeft" => Orientation::LandscapeLeft,
        "landscapeRight" => Orientation::LandscapeRight,
        other => return Err(format!("Unknown orientation: {other}")),
    };
    let mut bridge = state.bridge.lock().await;
    bridge.camera_mut().set_orientation(orientation);
    Ok(())
}

/// Dismiss the capture UI without taking a picture.
#[tauri::command]
pub async fn camera_close(state: tauri::State<'_, AppState>) -> Result<(), String> {
    let mut bridge = state.bridge.lock().await;
    bridge.close_capture();
    Ok(())
}
