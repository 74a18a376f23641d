//! Location capability.
//!
//! One request walks `Idle → RequestingPermission → Fetching → Delivered`
//! or ends in `Failed` with a fixed, user-facing reason. A disable control
//! at any point forces `Idle`, clears the cached sample, and bumps the
//! delivery epoch so a fix still in flight is suppressed instead of
//! delivered. Permission denial is never retried automatically.

use std::sync::Arc;

use async_trait::async_trait;

use super::{PermissionKind, Permissions};
use crate::bridge::message::LocationSample;
use crate::error::{Error, Result};

/// Fixed user-facing reason for a denied location permission.
pub const LOCATION_DENIED: &str = "拒絕存取位置";

/// Fixed user-facing reason when no fix can be obtained.
pub const LOCATION_UNAVAILABLE: &str = "無法搜尋使用者位置";

/// Fallback coordinates delivered by the static source.
pub const FALLBACK_COORDS: LocationSample = LocationSample {
    latitude: 25.033964,
    longitude: 121.564472,
};

/// OS location service seam: one async call, one fix.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Obtain the current position.
    async fn current_position(&self) -> Result<LocationSample>;
}

/// Source returning a fixed coordinate.
///
/// The default on hosts without a positioning service, and the test double.
pub struct StaticLocationSource {
    sample: LocationSample,
}

impl StaticLocationSource {
    /// Source that always returns `sample`.
    pub fn new(sample: LocationSample) -> Self {
        Self { sample }
    }
}

impl Default for StaticLocationSource {
    fn default() -> Self {
        Self::new(FALLBACK_COORDS)
    }
}

#[async_trait]
impl LocationSource for StaticLocationSource {
    async fn current_position(&self) -> Result<LocationSample> {
        Ok(self.sample)
    }
}

/// Lifecycle of one location request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationState {
    /// Nothing in flight.
    Idle,
    /// Waiting on the OS permission prompt.
    RequestingPermission,
    /// Waiting on the OS fix.
    Fetching,
    /// A sample was obtained and handed to the bridge.
    Delivered,
    /// Permission denied or no fix available.
    Failed,
}

/// Location provider.
pub struct LocationProvider {
    source: Arc<dyn LocationSource>,
    permissions: Arc<dyn Permissions>,
    state: LocationState,
    enabled: bool,
    epoch: u64,
    sample: Option<LocationSample>,
}

impl LocationProvider {
    /// Build a provider over the given OS seams.
    pub fn new(source: Arc<dyn LocationSource>, permissions: Arc<dyn Permissions>) -> Self {
        Self {
            source,
            permissions,
            state: LocationState::Idle,
            enabled: false,
            epoch: 0,
            sample: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LocationState {
        self.state
    }

    /// Whether the location toggle is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The last delivered sample, if any.
    pub fn sample(&self) -> Option<LocationSample> {
        self.sample
    }

    /// Turn the location toggle on.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Force `Idle` and clear the cached sample.
    ///
    /// A fetch still in flight is suppressed when it completes: its epoch no
    /// longer matches.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.epoch += 1;
        self.sample = None;
        self.state = LocationState::Idle;
    }

    /// Obtain one fix.
    ///
    /// `Ok(None)` means the request was superseded by a disable while the
    /// OS call was in flight; the sample is dropped, not delivered.
    pub async fn acquire(&mut self) -> Result<Option<LocationSample>> {
        let epoch = self.epoch;

        self.state = LocationState::RequestingPermission;
        if !self
            .permissions
            .request(PermissionKind::Location)
            .await
            .is_granted()
        {
            self.state = LocationState::Failed;
            return Err(Error::PermissionDenied(LOCATION_DENIED.into()));
        }

        self.state = LocationState::Fetching;
        match self.source.current_position().await {
            Ok(fix) => Ok(self.deliver(epoch, fix)),
            Err(e) => {
                self.state = LocationState::Failed;
                tracing::warn!(error = %e, "location fix failed");
                Err(Error::LocationUnavailable(LOCATION_UNAVAILABLE.into()))
            }
        }
    }

    fn deliver(&mut self, epoch: u64, fix: LocationSample) -> Option<LocationSample> {
        if epoch != self.epoch {
            tracing::debug!("location fix superseded by disable, dropping sample");
            return None;
        }
        self.state = LocationState::Delivered;
        self.sample = Some(fix);
        Some(fix)
    }
}

// ============================================================================
// TESTS
// ============================================================================
