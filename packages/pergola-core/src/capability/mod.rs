//! # Capability Providers
//!
//! Each provider wraps one OS feature as a single async call with a success
//! value or a permission/failure outcome:
//!
//! - [`camera`]   - capture persistence and capture-UI state
//! - [`device`]   - device identity snapshot
//! - [`location`] - GPS fix lifecycle
//! - [`store`]    - flat key/value persistence
//!
//! Providers own no shared mutable state; each invocation is independent
//! and side-effect-scoped to the OS capability it wraps. The OS permission
//! subsystem is modeled as one async yes/no seam shared by camera and
//! location.

pub mod camera;
pub mod device;
pub mod location;
pub mod store;

use async_trait::async_trait;

/// Outcome of an OS permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user (or platform policy) granted access.
    Granted,
    /// Access was denied; the caller must not retry automatically.
    Denied,
}

impl PermissionStatus {
    /// Whether access was granted.
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// The permissions the shell can ask the OS for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    /// Camera hardware access.
    Camera,
    /// Microphone access (requested alongside camera capture).
    Microphone,
    /// Foreground location access.
    Location,
    /// Photo library write access.
    MediaLibrary,
}

/// OS permission subsystem seam.
///
/// Prompts are async because the OS may show UI; the outcome is a plain
/// yes/no.
#[async_trait]
pub trait Permissions: Send + Sync {
    /// Request one permission, prompting if the platform requires it.
    async fn request(&self, kind: PermissionKind) -> PermissionStatus;
}

/// Fixed-outcome permission table.
///
/// Used by tests and by hosts whose platform layer already gates access
/// (desktop webviews prompt on their own).
pub struct StaticPermissions {
    denied: Vec<PermissionKind>,
}

impl StaticPermissions {
    /// Grant every prompt.
    pub fn granting_all() -> Self {
        Self { denied: Vec::new() }
    }

    /// Deny the listed kinds, grant everything else.
    pub fn denying(kinds: &[PermissionKind]) -> Self {
        Self {
            denied: kinds.to_vec(),
        }
    }
}

#[async_trait]
impl Permissions for StaticPermissions {
    async fn request(&self, kind: PermissionKind) -> PermissionStatus {
        if self.denied.contains(&kind) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_permissions() {
        let perms = StaticPermissions::denying(&[PermissionKind::Location]);
        assert_eq!(
            perms.request(PermissionKind::Location).await,
            PermissionStatus::Denied
        );
        assert!(perms.request(PermissionKind::Camera).await.is_granted());
    }
}
