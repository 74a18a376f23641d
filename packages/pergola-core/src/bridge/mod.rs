//! # Message Bridge
//!
//! Single point of translation between the embedded page's message protocol
//! and the native capability providers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           MESSAGE BRIDGE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   embedded page                                                         │
//! │        │  postMessage (JSON frame)                                      │
//! │        ▼                                                                │
//! │   receive ──► decode ──► dispatch ──┬──► camera provider                │
//! │                                     ├──► location provider              │
//! │                                     ├──► device identity                │
//! │                                     └──► key/value store                │
//! │        ▲                                                                │
//! │        │  OutboundQueue (ready state + bounded pending queue)           │
//! │   send ┴──────────────────────────────────────────────────── page       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `receive` is total: malformed input sets the visible error state and is
//! otherwise dropped, a recognized tag invokes exactly the one matching
//! handler, an unknown tag is ignored. Each handler calls at most one
//! capability provider and issues at most one direct response; location and
//! photo announcements are the only unsolicited pushes.

pub mod channel;
pub mod message;

use std::path::PathBuf;
use std::sync::Arc;

use channel::{Channel, OutboundQueue};
use message::{Inbound, Outbound};

use crate::capability::camera::CameraProvider;
use crate::capability::device::DeviceIdentity;
use crate::capability::location::LocationProvider;
use crate::capability::store::{keys, TokenStore};

/// Fixed user-facing text when an inbound frame cannot be understood.
pub const RECEIVE_FAILED: &str = "Web 資訊接收失敗";

/// Native-side notifications for the host UI layer.
///
/// Distinct from outbound web frames: these drive the shell's own views
/// (capture takeover, toasts, the error overlay).
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The page requested camera UI take-over and permission was granted.
    CameraOpened,
    /// The capture UI should be dismissed.
    CameraClosed,
    /// A photo landed in the library.
    PhotoSaved {
        /// Library path of the persisted frame.
        path: PathBuf,
    },
    /// The visible error state changed.
    VisibleError {
        /// The fixed, user-facing message.
        message: String,
    },
}

/// Sink for host events; the shell maps these onto its UI.
pub trait HostSink: Send + Sync {
    /// Deliver one event. Must not block.
    fn notify(&self, event: HostEvent);
}

/// Sink that discards every event. For headless use and tests.
pub struct NullHost;

impl HostSink for NullHost {
    fn notify(&self, _event: HostEvent) {}
}

enum FixKind {
    Initial,
    Update,
}

/// The message bridge.
///
/// Owns the outbound queue, the visible error state, and the capability
/// providers. The host serializes calls into it, so handlers never run
/// concurrently and frames are processed in arrival order.
pub struct Bridge {
    outbound: OutboundQueue,
    host: Arc<dyn HostSink>,
    location: LocationProvider,
    camera: CameraProvider,
    device: DeviceIdentity,
    store: Arc<TokenStore>,
    last_error: Option<String>,
}

impl Bridge {
    /// Assemble a bridge from its providers.
    pub fn new(
        location: LocationProvider,
        camera: CameraProvider,
        device: DeviceIdentity,
        store: Arc<TokenStore>,
        host: Arc<dyn HostSink>,
    ) -> Self {
        Self {
            outbound: OutboundQueue::new(),
            host,
            location,
            camera,
            device,
            store,
            last_error: None,
        }
    }

    /// Attach the live channel, flushing any queued frames.
    pub fn attach_channel(&mut self, channel: Arc<dyn Channel>) {
        self.outbound.attach(channel);
    }

    /// Drop the channel handle.
    pub fn detach_channel(&mut self) {
        self.outbound.detach();
    }

    /// Whether the outbound channel is attached.
    pub fn is_channel_ready(&self) -> bool {
        self.outbound.is_ready()
    }

    /// The visible error state, if set.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Mutable access to the camera provider, for the host's capture UI.
    pub fn camera_mut(&mut self) -> &mut CameraProvider {
        &mut self.camera
    }

    /// Whether the location toggle is on.
    pub fn is_location_enabled(&self) -> bool {
        self.location.is_enabled()
    }

    // ========================================================================
    // INBOUND
    // ========================================================================

    /// Handle one inbound frame.
    ///
    /// Never fails: malformed input sets the visible error state, unknown
    /// tags are dropped silently, and every recognized tag resolves to a
    /// logged outcome.
    pub async fn receive(&mut self, raw: &str) {
        let inbound = match Inbound::decode(raw) {
            Ok(Some(inbound)) => inbound,
            Ok(None) => {
                tracing::debug!("ignoring frame with unknown tag");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "inbound frame rejected");
                self.fail_visibly(RECEIVE_FAILED);
                return;
            }
        };

        match inbound {
            Inbound::OpenCamera => self.handle_open_camera().await,
            Inbound::SendPhoto { photo_url } => self.handle_send_photo(&photo_url).await,
            Inbound::GetPlatformInfo => self.handle_platform_info(),
            Inbound::SaveToken { token } => self.handle_save_token(&token),
            Inbound::EnableLocation => {
                self.location.enable();
                self.push_fix(FixKind::Initial).await;
            }
            Inbound::RefreshLocation => self.handle_refresh_location().await,
            Inbound::DisableLocation => self.location.disable(),
            Inbound::RequestLocation => self.push_fix(FixKind::Initial).await,
        }
    }

    // ========================================================================
    // HOST-SIDE ENTRY POINTS
    // ========================================================================

    /// Complete a native capture: persist the frame and announce it to the
    /// page as an unsolicited `sendPhoto` push.
    pub async fn complete_capture(&mut self, frame: &[u8]) {
        match self.camera.take_picture(frame).await {
            Ok(photo) => {
                let content = self.camera.delivery_content(&photo);
                self.host.notify(HostEvent::CameraClosed);
                self.host.notify(HostEvent::PhotoSaved {
                    path: photo.path.clone(),
                });
                self.send(Outbound::Photo { content });
            }
            Err(e) if e.is_user_visible() => self.fail_visibly(&e.to_string()),
            Err(e) => tracing::error!(error = %e, "capture could not be persisted"),
        }
    }

    /// Dismiss the capture UI without taking a picture.
    pub fn close_capture(&mut self) {
        self.camera.close_capture();
        self.host.notify(HostEvent::CameraClosed);
    }

    /// Native location toggle (the shell's own on/off control).
    pub async fn set_location_enabled(&mut self, enabled: bool) {
        if enabled {
            self.location.enable();
            self.push_fix(FixKind::Initial).await;
        } else {
            self.location.disable();
        }
    }

    // ========================================================================
    // HANDLERS
    // ========================================================================

    async fn handle_open_camera(&mut self) {
        match self.camera.open_capture().await {
            Ok(()) => self.host.notify(HostEvent::CameraOpened),
            Err(e) => self.fail_visibly(&e.to_string()),
        }
    }

    async fn handle_send_photo(&mut self, photo_url: &str) {
        match self.camera.import_photo(photo_url).await {
            Ok(photo) => self.host.notify(HostEvent::PhotoSaved { path: photo.path }),
            Err(e) if e.is_user_visible() => self.fail_visibly(&e.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "page photo could not be persisted");
                self.fail_visibly(RECEIVE_FAILED);
            }
        }
    }

    fn handle_platform_info(&mut self) {
        let info = self.device.info();
        self.send(Outbound::DeviceInfo(info));
    }

    fn handle_save_token(&mut self, token: &str) {
        match self.store.set(keys::AUTH_TOKEN, token) {
            Ok(()) => self.send(Outbound::TokenSaved),
            Err(e) => {
                tracing::error!(error = %e, "token persistence failed");
                self.send(Outbound::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    async fn handle_refresh_location(&mut self) {
        if !self.location.is_enabled() {
            tracing::debug!("location refresh ignored, provider disabled");
            return;
        }
        self.push_fix(FixKind::Update).await;
    }

    async fn push_fix(&mut self, kind: FixKind) {
        match self.location.acquire().await {
            Ok(Some(sample)) => self.send(match kind {
                FixKind::Initial => Outbound::LocationFix(sample),
                FixKind::Update => Outbound::LocationUpdate(sample),
            }),
            // Superseded by a disable while the fix was in flight.
            Ok(None) => {}
            Err(e) => self.fail_visibly(&e.to_string()),
        }
    }

    // ========================================================================
    // OUTBOUND
    // ========================================================================

    fn send(&mut self, message: Outbound) {
        self.outbound.send(&message);
    }

    fn fail_visibly(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
        self.host.notify(HostEvent::VisibleError {
            message: message.to_string(),
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::camera::{PhotoDelivery, PhotoLibrary, LIBRARY_DENIED};
    use crate::capability::location::{
        LocationProvider, StaticLocationSource, LOCATION_DENIED,
    };
    use crate::capability::store::TokenStore;
    use crate::capability::{PermissionKind, StaticPermissions};
    use crate::bridge::message::Platform;
    use crate::error::Result;
    use parking_lot::Mutex;
    use serde_json::Value;

    #[derive(Default)]
    struct RecordingChannel {
        frames: Mutex<Vec<String>>,
    }

    impl RecordingChannel {
        fn frames(&self) -> Vec<Value> {
            self.frames
                .lock()
                .iter()
                .map(|f| serde_json::from_str(f).unwrap())
                .collect()
        }
    }

    impl Channel for RecordingChannel {
        fn post_message(&self, frame: &str) -> Result<()> {
            self.frames.lock().push(frame.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        events: Mutex<Vec<HostEvent>>,
    }

    impl HostSink for RecordingHost {
        fn notify(&self, event: HostEvent) {
            self.events.lock().push(event);
        }
    }

    struct Fixture {
        bridge: Bridge,
        channel: Arc<RecordingChannel>,
        host: Arc<RecordingHost>,
        store: Arc<TokenStore>,
        _library: tempfile::TempDir,
    }

    fn fixture_with(permissions: StaticPermissions, store: Arc<TokenStore>) -> Fixture {
        let permissions = Arc::new(permissions);
        let library = tempfile::tempdir().unwrap();
        let camera = CameraProvider::new(
            permissions.clone(),
            PhotoLibrary::new(library.path()),
            PhotoDelivery::LibraryUri,
        );
        let location = LocationProvider::new(
            Arc::new(StaticLocationSource::default()),
            permissions,
        );
        let device = DeviceIdentity::with_platform(
            Platform::Ios,
            "17.4",
            "iPhone14,2",
            store.clone(),
        );
        let host = Arc::new(RecordingHost::default());
        let mut bridge = Bridge::new(location, camera, device, store.clone(), host.clone());

        let channel = Arc::new(RecordingChannel::default());
        bridge.attach_channel(channel.clone());

        Fixture {
            bridge,
            channel,
            host,
            store,
            _library: library,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            StaticPermissions::granting_all(),
            Arc::new(TokenStore::in_memory()),
        )
    }

    #[tokio::test]
    async fn test_platform_info_scenario() {
        // deviceId lookup denied: the store refuses writes.
        let store = Arc::new(TokenStore::open("/nonexistent-dir/pergola/store.json").unwrap());
        let mut f = fixture_with(StaticPermissions::granting_all(), store);

        f.bridge.receive(r#"{"action":"getPlatformInfo"}"#).await;

        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        let expected: Value = serde_json::from_str(
            r#"{"status":"sendDeviceInfo","content":{"plateformOS":"ios","osVersion":"17.4","osModelName":"iPhone14,2","deviceId":null},"message":"傳送裝置資訊"}"#,
        )
        .unwrap();
        assert_eq!(frames[0], expected);
    }

    #[tokio::test]
    async fn test_save_token_scenario() {
        let mut f = fixture();

        f.bridge
            .receive(r#"{"action":"saveToken","payload":{"token":"abc123"}}"#)
            .await;

        assert_eq!(f.store.get(keys::AUTH_TOKEN).as_deref(), Some("abc123"));
        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        let expected: Value =
            serde_json::from_str(r#"{"status":"saved","message":"Token 已儲存"}"#).unwrap();
        assert_eq!(frames[0], expected);
    }

    #[tokio::test]
    async fn test_save_token_failure_is_relayed_as_error_frame() {
        let store = Arc::new(TokenStore::open("/nonexistent-dir/pergola/store.json").unwrap());
        let mut f = fixture_with(StaticPermissions::granting_all(), store);

        f.bridge
            .receive(r#"{"action":"saveToken","payload":{"token":"abc123"}}"#)
            .await;

        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["status"], "error");
    }

    #[tokio::test]
    async fn test_unknown_tag_is_dropped_without_error_state() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"startPayment"}"#).await;

        assert!(f.channel.frames().is_empty());
        assert!(f.bridge.last_error().is_none());
        assert!(f.host.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_sets_visible_error_and_dispatches_nothing() {
        let mut f = fixture();

        f.bridge.receive("{ not json").await;

        assert!(f.channel.frames().is_empty());
        assert_eq!(f.bridge.last_error(), Some(RECEIVE_FAILED));
        assert_eq!(
            f.host.events.lock().as_slice(),
            &[HostEvent::VisibleError {
                message: RECEIVE_FAILED.into()
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_tag_sets_visible_error() {
        let mut f = fixture();
        f.bridge.receive(r#"{"payload":{"token":"x"}}"#).await;
        assert_eq!(f.bridge.last_error(), Some(RECEIVE_FAILED));
    }

    #[tokio::test]
    async fn test_enable_location_pushes_one_fix() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"GET_INIT_LOCATION"}"#).await;

        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["status"], "LOCATION_INFO");
        assert_eq!(frames[0]["content"]["latitude"], 25.033964);
        assert!(f.bridge.is_location_enabled());
    }

    #[tokio::test]
    async fn test_location_permission_denied_yields_no_push() {
        let mut f = fixture_with(
            StaticPermissions::denying(&[PermissionKind::Location]),
            Arc::new(TokenStore::in_memory()),
        );

        f.bridge.receive(r#"{"action":"GET_INIT_LOCATION"}"#).await;

        assert!(f.channel.frames().is_empty());
        assert_eq!(f.bridge.last_error(), Some(LOCATION_DENIED));
    }

    #[tokio::test]
    async fn test_refresh_is_ignored_while_disabled() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"UPDATE_LOCATION"}"#).await;
        assert!(f.channel.frames().is_empty());

        f.bridge.receive(r#"{"action":"GET_INIT_LOCATION"}"#).await;
        f.bridge.receive(r#"{"action":"UPDATE_LOCATION"}"#).await;
        let frames = f.channel.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1]["status"], "UPDATE_LOCATION");
    }

    #[tokio::test]
    async fn test_gps_off_disables_and_pushes_nothing() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"GET_INIT_LOCATION"}"#).await;
        f.bridge.receive(r#"{"action":"GPS_OFF"}"#).await;

        assert!(!f.bridge.is_location_enabled());
        // Only the initial fix was pushed.
        assert_eq!(f.channel.frames().len(), 1);
    }

    #[tokio::test]
    async fn test_request_location_works_without_the_toggle() {
        let mut f = fixture();

        f.bridge.receive(r#"{"type":"REQUEST_LOCATION"}"#).await;

        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["status"], "LOCATION_INFO");
        assert!(!f.bridge.is_location_enabled());
    }

    #[tokio::test]
    async fn test_open_camera_raises_host_event() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"openCamera"}"#).await;

        assert!(f.channel.frames().is_empty());
        assert_eq!(f.host.events.lock().as_slice(), &[HostEvent::CameraOpened]);
        assert!(f.bridge.camera_mut().is_capture_open());
    }

    #[tokio::test]
    async fn test_complete_capture_pushes_send_photo() {
        let mut f = fixture();

        f.bridge.receive(r#"{"action":"openCamera"}"#).await;
        f.bridge.complete_capture(b"frame-bytes").await;

        let frames = f.channel.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["status"], "sendPhoto");
        assert_eq!(frames[0]["message"], "傳送照片");
        assert!(frames[0]["content"].as_str().unwrap().starts_with("file://"));
        assert!(!f.bridge.camera_mut().is_capture_open());
    }

    #[tokio::test]
    async fn test_capture_with_denied_library_surfaces_denial() {
        let mut f = fixture_with(
            StaticPermissions::denying(&[PermissionKind::MediaLibrary]),
            Arc::new(TokenStore::in_memory()),
        );

        f.bridge.complete_capture(b"frame").await;

        assert!(f.channel.frames().is_empty());
        assert_eq!(f.bridge.last_error(), Some(LIBRARY_DENIED));
    }

    #[tokio::test]
    async fn test_send_photo_from_page_lands_in_library() {
        let mut f = fixture();

        f.bridge
            .receive(r#"{"action":"SEND_PHOTO","photoUrl":"data:image/png;base64,aGVsbG8="}"#)
            .await;

        let events = f.host.events.lock();
        assert!(matches!(events.as_slice(), [HostEvent::PhotoSaved { .. }]));
        // No direct web response for this tag.
        assert!(f.channel.frames().is_empty());
    }

    #[tokio::test]
    async fn test_frames_sent_before_ready_flush_on_attach() {
        let mut f = fixture();
        f.bridge.detach_channel();

        f.bridge.receive(r#"{"action":"getPlatformInfo"}"#).await;
        assert!(f.channel.frames().is_empty());

        let late = Arc::new(RecordingChannel::default());
        f.bridge.attach_channel(late.clone());
        let frames = late.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["status"], "sendDeviceInfo");
    }
}
