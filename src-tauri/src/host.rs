use pergola_core::capability::camera::PHOTO_SAVED;
use pergola_core::{HostEvent, HostSink};
use tauri::{AppHandle, Emitter};

/// Relays bridge host events as Tauri events for the native UI layer.
pub struct EventHost {
    app: AppHandle,
}

impl EventHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl HostSink for EventHost {
    fn notify(&self, event: HostEvent) {
        let (name, payload) = match event {
            HostEvent::CameraOpened => ("camera-open", serde_json::json!({})),
            HostEvent::CameraClosed => ("camera-close", serde_json::json!({})),
            HostEvent::PhotoSaved { path } => (
                "photo-saved",
                serde_json::json!({ "path": path, "notice": PHOTO_SAVED }),
            ),
            HostEvent::VisibleError { message } => {
                ("bridge-error", serde_json::json!({ "message": message }))
            }
        };
        if let Err(e) = self.app.emit(name, payload) {
            tracing::warn!(error = %e, event = name, "host event emit failed");
        }
    }
}
