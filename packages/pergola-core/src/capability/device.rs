//! Device identity capability.
//!
//! Composes the `sendDeviceInfo` snapshot: platform discriminant from the
//! compile target, OS version and model name supplied by the host shell,
//! and a stable installation identifier persisted through the key/value
//! store. Computed once per process lifetime. The identifier lookup never
//! propagates a failure: a store that refuses the write yields
//! `deviceId: null`.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::store::{keys, TokenStore};
use crate::bridge::message::{DeviceInfo, Platform};

impl Platform {
    /// Platform discriminant for the compile target.
    pub fn current() -> Platform {
        #[cfg(target_os = "android")]
        {
            Platform::Android
        }
        #[cfg(target_os = "ios")]
        {
            Platform::Ios
        }
        #[cfg(not(any(target_os = "android", target_os = "ios")))]
        {
            Platform::Other
        }
    }
}

/// Device identity provider.
pub struct DeviceIdentity {
    platform: Platform,
    os_version: String,
    model_name: String,
    store: Arc<TokenStore>,
    cached: OnceCell<DeviceInfo>,
}

impl DeviceIdentity {
    /// Build a provider for the compile-target platform.
    pub fn new(
        os_version: impl Into<String>,
        model_name: impl Into<String>,
        store: Arc<TokenStore>,
    ) -> Self {
        Self::with_platform(Platform::current(), os_version, model_name, store)
    }

    /// Build a provider with an explicit platform discriminant.
    pub fn with_platform(
        platform: Platform,
        os_version: impl Into<String>,
        model_name: impl Into<String>,
        store: Arc<TokenStore>,
    ) -> Self {
        Self {
            platform,
            os_version: os_version.into(),
            model_name: model_name.into(),
            store,
            cached: OnceCell::new(),
        }
    }

    /// Snapshot of the device identity, computed once per process lifetime.
    pub fn info(&self) -> DeviceInfo {
        self.cached
            .get_or_init(|| DeviceInfo {
                platform: self.platform,
                os_version: self.os_version.clone(),
                model_name: self.model_name.clone(),
                device_id: self.device_id(),
            })
            .clone()
    }

    /// Stable installation identifier.
    ///
    /// Minted once (UUID v4) and persisted under `installationId`; any
    /// storage failure maps to `None`, never an error.
    pub fn device_id(&self) -> Option<String> {
        if let Some(id) = self.store.get(keys::INSTALLATION_ID) {
            return Some(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        match self.store.set(keys::INSTALLATION_ID, &id) {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "installation id lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installation_id_is_minted_once() {
        let store = Arc::new(TokenStore::in_memory());
        let device = DeviceIdentity::new("17.4", "iPhone14,2", store.clone());

        let first = device.info();
        let second = device.info();
        assert!(first.device_id.is_some());
        assert_eq!(first, second);
        assert_eq!(store.get(keys::INSTALLATION_ID), first.device_id);
    }

    #[test]
    fn test_storage_failure_yields_null_id() {
        // A store rooted in a directory that does not exist refuses writes.
        let store = Arc::new(TokenStore::open("/nonexistent-dir/pergola/store.json").unwrap());
        let device =
            DeviceIdentity::with_platform(Platform::Ios, "17.4", "iPhone14,2", store);

        let info = device.info();
        assert_eq!(info.platform, Platform::Ios);
        assert_eq!(info.device_id, None);
    }

    #[test]
    fn test_existing_id_is_reused() {
        let store = Arc::new(TokenStore::in_memory());
        store.set(keys::INSTALLATION_ID, "fixed-id").unwrap();
        let device = DeviceIdentity::new("14", "Pixel 8", store);

        assert_eq!(device.info().device_id.as_deref(), Some("fixed-id"));
    }
}
