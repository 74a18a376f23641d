//! Camera capability.
//!
//! The capture UI itself belongs to the host. This provider owns the state
//! around it (capture view up or not, active lens, last reported
//! orientation) and the data path: persisting a frame to the photo library
//! under a timestamp-derived name and producing the rendition announced to
//! the page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;

use super::{PermissionKind, Permissions};
use crate::error::{Error, Result};

/// Native notice shown after a photo lands in the library.
pub const PHOTO_SAVED: &str = "照片已存到相簿！";

/// Fixed user-facing reason for a denied media-library permission.
pub const LIBRARY_DENIED: &str = "未授權存取相簿！";

/// Fixed user-facing reason for a denied camera permission.
pub const CAMERA_DENIED: &str = "未授權使用相機";

/// Which rendition of a capture is announced to the page.
///
/// Exactly one policy is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoDelivery {
    /// Push the saved library file's URI.
    #[default]
    LibraryUri,
    /// Push the image inline as a base64 data URL.
    InlineBase64,
}

/// Which lens the capture UI uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear lens.
    Back,
    /// Selfie lens.
    Front,
}

impl Facing {
    /// The other lens.
    pub fn toggled(self) -> Facing {
        match self {
            Facing::Back => Facing::Front,
            Facing::Front => Facing::Back,
        }
    }

    /// Wire name for the host UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Back => "back",
            Facing::Front => "front",
        }
    }
}

/// Orientation last reported by the capture UI. Pure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Device upright.
    Portrait,
    /// Device upside down.
    PortraitUpsideDown,
    /// Home indicator to the right.
    LandscapeLeft,
    /// Home indicator to the left.
    LandscapeRight,
}

/// One persisted capture.
///
/// Create-on-capture, persist-to-library, then encode-to-text for
/// transmission; no history is retained.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    /// Library path of the persisted frame.
    pub path: PathBuf,
    /// The raw frame bytes.
    pub bytes: Vec<u8>,
}

impl CapturedPhoto {
    /// `file://` URI of the library copy.
    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// Inline data-URL rendition of the frame.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Decode a page-supplied photo payload.
///
/// Accepts either a full `data:` URL or a bare base64 string; the page
/// sends the former.
pub fn decode_photo_data(payload: &str) -> Result<Vec<u8>> {
    let b64 = payload
        .rsplit_once(',')
        .map(|(_, body)| body)
        .unwrap_or(payload);
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| Error::InvalidPhotoData(e.to_string()))
}

/// Directory-backed photo library.
pub struct PhotoLibrary {
    dir: PathBuf,
}

impl PhotoLibrary {
    /// Library rooted at `dir`. Created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The library root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one frame under a timestamp-derived name.
    pub fn save(&self, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let mut suffix = uuid::Uuid::new_v4().simple().to_string();
        suffix.truncate(8);
        let name = format!(
            "photo-{}-{}.png",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            suffix
        );
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "photo persisted to library");
        Ok(path)
    }
}

/// Camera provider.
pub struct CameraProvider {
    permissions: Arc<dyn Permissions>,
    library: PhotoLibrary,
    policy: PhotoDelivery,
    facing: Facing,
    orientation: Orientation,
    capture_open: bool,
}

impl CameraProvider {
    /// Build a provider over the given permission seam and library.
    pub fn new(
        permissions: Arc<dyn Permissions>,
        library: PhotoLibrary,
        policy: PhotoDelivery,
    ) -> Self {
        Self {
            permissions,
            library,
            policy,
            facing: Facing::Back,
            orientation: Orientation::LandscapeLeft,
            capture_open: false,
        }
    }

    /// Whether the capture UI is up.
    pub fn is_capture_open(&self) -> bool {
        self.capture_open
    }

    /// Active lens.
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Flip the lens. Pure state, no provider call.
    pub fn toggle_facing(&mut self) -> Facing {
        self.facing = self.facing.toggled();
        self.facing
    }

    /// Orientation last reported by the capture UI.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Record the orientation the capture UI reported.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Ask for camera access and switch into the capture-UI state.
    pub async fn open_capture(&mut self) -> Result<()> {
        if !self
            .permissions
            .request(PermissionKind::Camera)
            .await
            .is_granted()
        {
            return Err(Error::PermissionDenied(CAMERA_DENIED.into()));
        }
        self.capture_open = true;
        Ok(())
    }

    /// Leave the capture-UI state.
    pub fn close_capture(&mut self) {
        self.capture_open = false;
    }

    /// Persist one captured frame to the library.
    ///
    /// Requests media-library write access first; denial aborts with the
    /// fixed reason. Success leaves the capture UI closed.
    pub async fn take_picture(&mut self, frame: &[u8]) -> Result<CapturedPhoto> {
        if !self
            .permissions
            .request(PermissionKind::MediaLibrary)
            .await
            .is_granted()
        {
            return Err(Error::PermissionDenied(LIBRARY_DENIED.into()));
        }
        let path = self
            .library
            .save(frame)
            .map_err(|e| Error::CaptureFailed(e.to_string()))?;
        self.capture_open = false;
        Ok(CapturedPhoto {
            path,
            bytes: frame.to_vec(),
        })
    }

    /// Persist a page-supplied photo (a base64 data URL) to the library.
    pub async fn import_photo(&self, payload: &str) -> Result<CapturedPhoto> {
        let bytes = decode_photo_data(payload)?;
        if !self
            .permissions
            .request(PermissionKind::MediaLibrary)
            .await
            .is_granted()
        {
            return Err(Error::PermissionDenied(LIBRARY_DENIED.into()));
        }
        let path = self
            .library
            .save(&bytes)
            .map_err(|e| Error::CaptureFailed(e.to_string()))?;
        Ok(CapturedPhoto { path, bytes })
    }

    /// Wire rendition of a capture under the active delivery policy.
    pub fn delivery_content(&self, photo: &CapturedPhoto) -> String {
        match self.policy {
            PhotoDelivery::LibraryUri => photo.uri(),
            PhotoDelivery::InlineBase64 => photo.to_data_url(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
