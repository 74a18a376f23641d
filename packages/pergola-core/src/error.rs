//! # Error Handling
//!
//! Error types for the Pergola bridge core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                      │
//! │  │                                                                      │
//! │  ├── Bridge / Codec Errors                                              │
//! │  │   ├── MalformedMessage      - Inbound frame is not valid JSON        │
//! │  │   ├── MissingTag            - Frame has no action/type tag           │
//! │  │   ├── ChannelNotReady       - Outbound channel not yet attached      │
//! │  │   └── ChannelWriteFailed    - Host transport rejected a frame        │
//! │  │                                                                      │
//! │  ├── Permission Errors                                                  │
//! │  │   └── PermissionDenied      - OS denied a capability prompt          │
//! │  │                                                                      │
//! │  ├── Location Errors                                                    │
//! │  │   └── LocationUnavailable   - No fix could be obtained               │
//! │  │                                                                      │
//! │  ├── Camera Errors                                                      │
//! │  │   ├── CaptureFailed         - Frame could not be persisted           │
//! │  │   └── InvalidPhotoData      - Photo payload was not decodable        │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                     │
//! │  │   ├── StorageReadError      - Failed to read from the store          │
//! │  │   └── StorageWriteError     - Failed to write to the store           │
//! │  │                                                                      │
//! │  └── Internal Errors                                                    │
//! │      └── SerializationError    - Outbound frame failed to encode        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//!
//! All failures are terminal at the handler boundary. `Bridge::receive`
//! never returns an error to the host: malformed input sets the visible
//! error state, permission denials surface their fixed localized reason,
//! channel problems queue or drop with a log line, and capability failures
//! are mapped to null/failure results at the provider boundary.

use thiserror::Error;

/// Result type alias for bridge core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the bridge core
///
/// Errors are categorized by subsystem so that handlers can decide which
/// failures are shown to the user and which are only logged.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Bridge / Codec Errors (100-199)
    // ========================================================================
    /// Inbound frame was not a valid JSON document
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Inbound frame carried no recognizable tag field
    #[error("Message has no action tag")]
    MissingTag,

    /// The outbound channel has not been attached yet
    #[error("Channel is not ready")]
    ChannelNotReady,

    /// The host transport rejected an outbound frame
    #[error("Channel write failed: {0}")]
    ChannelWriteFailed(String),

    // ========================================================================
    // Permission Errors (200-299)
    // ========================================================================
    /// The OS denied a capability prompt. Carries the fixed, user-facing
    /// reason string.
    #[error("{0}")]
    PermissionDenied(String),

    // ========================================================================
    // Location Errors (300-399)
    // ========================================================================
    /// No location fix could be obtained. Carries the fixed, user-facing
    /// reason string.
    #[error("{0}")]
    LocationUnavailable(String),

    // ========================================================================
    // Camera Errors (400-499)
    // ========================================================================
    /// A captured frame could not be persisted
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// A photo payload from the page could not be decoded
    #[error("Invalid photo data: {0}")]
    InvalidPhotoData(String),

    // ========================================================================
    // Storage Errors (500-599)
    // ========================================================================
    /// Failed to read from the key/value store
    #[error("Failed to read from store: {0}")]
    StorageReadError(String),

    /// Failed to write to the key/value store
    #[error("Failed to write to store: {0}")]
    StorageWriteError(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================
    /// An outbound frame failed to serialize
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Bridge / codec
    /// - 200-299: Permissions
    /// - 300-399: Location
    /// - 400-499: Camera
    /// - 500-599: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Bridge / codec (100-199)
            Error::MalformedMessage(_) => 100,
            Error::MissingTag => 101,
            Error::ChannelNotReady => 102,
            Error::ChannelWriteFailed(_) => 103,

            // Permissions (200-299)
            Error::PermissionDenied(_) => 200,

            // Location (300-399)
            Error::LocationUnavailable(_) => 300,

            // Camera (400-499)
            Error::CaptureFailed(_) => 400,
            Error::InvalidPhotoData(_) => 401,

            // Storage (500-599)
            Error::StorageReadError(_) => 500,
            Error::StorageWriteError(_) => 501,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error carries a message meant for the user
    ///
    /// User-visible errors hold a fixed localized reason string and are
    /// surfaced through the shell's error overlay. Everything else is only
    /// logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Error::PermissionDenied(_) | Error::LocationUnavailable(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageWriteError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::MalformedMessage("test".into()).code(), 100);
        assert_eq!(Error::MissingTag.code(), 101);
        assert_eq!(Error::PermissionDenied("test".into()).code(), 200);
        assert_eq!(Error::LocationUnavailable("test".into()).code(), 300);
        assert_eq!(Error::CaptureFailed("test".into()).code(), 400);
        assert_eq!(Error::StorageReadError("test".into()).code(), 500);
        assert_eq!(Error::SerializationError("test".into()).code(), 900);
    }

    #[test]
    fn test_user_visible_errors() {
        assert!(Error::PermissionDenied("拒絕存取位置".into()).is_user_visible());
        assert!(Error::LocationUnavailable("test".into()).is_user_visible());
        assert!(!Error::MalformedMessage("test".into()).is_user_visible());
        assert!(!Error::ChannelNotReady.is_user_visible());
    }

    #[test]
    fn test_permission_denied_displays_reason_verbatim() {
        let err = Error::PermissionDenied("拒絕存取位置".into());
        assert_eq!(err.to_string(), "拒絕存取位置");
    }
}
