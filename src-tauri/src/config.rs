use std::path::PathBuf;

use pergola_core::capability::camera::PhotoDelivery;

/// The remote page hosted when no override is configured.
pub const DEFAULT_START_URL: &str = "https://mdev.houseflow.tw/";

/// Shell configuration, read from environment variables with defaults.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// The remote page the webview hosts.
    pub start_url: String,
    /// Override for the app data directory (store + photo library).
    pub data_dir: Option<PathBuf>,
    /// Which rendition of a capture is announced to the page.
    pub photo_policy: PhotoDelivery,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        let start_url =
            std::env::var("PERGOLA_START_URL").unwrap_or_else(|_| DEFAULT_START_URL.into());
        let data_dir = std::env::var_os("PERGOLA_DATA_DIR").map(PathBuf::from);
        let photo_policy = match std::env::var("PERGOLA_PHOTO_POLICY").as_deref() {
            Ok("inline") => PhotoDelivery::InlineBase64,
            _ => PhotoDelivery::LibraryUri,
        };
        Self {
            start_url,
            data_dir,
            photo_policy,
        }
    }

    /// Start URL with the cache-busting query the page expects.
    pub fn busted_start_url(&self) -> String {
        let sep = if self.start_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}t={}",
            self.start_url,
            sep,
            chrono::Utc::now().timestamp_millis()
        )
    }
}
