mod channel;
mod commands;
mod config;
mod host;
mod state;

use std::sync::Arc;

use pergola_core::capability::camera::{CameraProvider, PhotoLibrary};
use pergola_core::capability::device::DeviceIdentity;
use pergola_core::capability::location::{LocationProvider, StaticLocationSource};
use pergola_core::capability::store::TokenStore;
use pergola_core::capability::StaticPermissions;
use pergola_core::Bridge;
use state::AppState;
use tauri::{Manager, WebviewUrl};

/// Page-side shim: the remote page talks `ReactNativeWebView.postMessage`,
/// the shell listens over Tauri IPC. Also signals channel readiness once
/// the page has loaded so queued frames can flush.
const INIT_SCRIPT: &str = r#"
(function () {
  const invoke = (cmd, args) => window.__TAURI_INTERNALS__.invoke(cmd, args);
  window.ReactNativeWebView = {
    postMessage: (raw) => { invoke('bridge_receive', { raw: String(raw) }); },
  };
  window.addEventListener('DOMContentLoaded', () => { invoke('bridge_ready', {}); });
})();
"#;

pub fn run() {
    // Set up tracing for the native shell
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pergola_core=debug".into()),
        )
        .init();

    let config = config::ShellConfig::from_env();
    tracing::info!(url = %config.start_url, "Starting Pergola Shell v{}", pergola_core::version());

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .plugin(tauri_plugin_os::init())
        .setup(move |app| {
            let data_dir = match config.data_dir.clone() {
                Some(dir) => dir,
                None => app.path().app_data_dir()?,
            };

            let store = Arc::new(TokenStore::open(data_dir.join("pergola-store.json"))?);
            // The desktop webview and OS handle the actual prompts; the
            // mobile shells swap in their platform permission layer here.
            let permissions = Arc::new(StaticPermissions::granting_all());
            let camera = CameraProvider::new(
                permissions.clone(),
                PhotoLibrary::new(data_dir.join("photos")),
                config.photo_policy,
            );
            let location = LocationProvider::new(
                Arc::new(StaticLocationSource::default()),
                permissions,
            );
            let device = DeviceIdentity::new(
                tauri_plugin_os::version().to_string(),
                tauri_plugin_os::hostname(),
                store.clone(),
            );
            let host = Arc::new(host::EventHost::new(app.handle().clone()));
            app.manage(AppState::new(Bridge::new(
                location, camera, device, store, host,
            )));

            let start_url: tauri::Url = config.busted_start_url().parse()?;
            let allowed_host = start_url.host_str().unwrap_or("").to_string();
            let handle = app.handle().clone();

            // Build the main window+webview manually so we can attach the
            // init script and navigation handler.
            tauri::WebviewWindowBuilder::new(app, "main", WebviewUrl::External(start_url))
                .title("Pergola")
                .inner_size(1280.0, 800.0)
                .resizable(true)
                .initialization_script(INIT_SCRIPT)
                // Block external navigations — open them in the system
                // browser instead, so the hosted page keeps the window.
                .on_navigation(move |url| {
                    let nav_host = url.host_str().unwrap_or("");
                    if url.scheme() == "tauri"
                        || nav_host == allowed_host
                        || nav_host == "localhost"
                        || nav_host == "127.0.0.1"
                    {
                        return true;
                    }
                    tracing::info!("Blocking external navigation, opening in browser: {}", url);
                    let _ = tauri_plugin_shell::ShellExt::shell(&handle)
                        .open(url.as_str(), None::<tauri_plugin_shell::open::Program>);
                    false
                })
                .build()?;

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Bridge
            commands::bridge::bridge_receive,
            commands::bridge::bridge_ready,
            commands::bridge::bridge_last_error,

            // Camera
            commands::camera::camera_capture,
            commands::camera::camera_toggle_facing,
            commands::camera::camera_set_orientation,
            commands::camera::camera_close,

            // Location
            commands::location::location_set_enabled,
            commands::location::location_enabled,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Pergola Shell");
}
