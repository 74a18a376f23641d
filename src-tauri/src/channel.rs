use pergola_core::bridge::channel::Channel;
use pergola_core::{Error, Result};
use tauri::WebviewWindow;

/// Outbound channel over the hosted webview.
///
/// Delivers frames by dispatching a `MessageEvent` into the page, matching
/// the page's `window.addEventListener("message")` contract.
pub struct WebviewChannel {
    webview: WebviewWindow,
}

impl WebviewChannel {
    pub fn new(webview: WebviewWindow) -> Self {
        Self { webview }
    }
}

impl Channel for WebviewChannel {
    fn post_message(&self, frame: &str) -> Result<()> {
        // Embed the frame as a JS string literal; serde_json handles the
        // escaping.
        let literal = serde_json::to_string(frame)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        let script =
            format!("window.dispatchEvent(new MessageEvent('message', {{ data: {literal} }}));");
        self.webview
            .eval(&script)
            .map_err(|e| Error::ChannelWriteFailed(e.to_string()))
    }
}
