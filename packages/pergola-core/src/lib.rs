//! # Pergola Core
//!
//! Message bridge between an embedded web page and native device
//! capabilities. The host shell owns the webview and its transport; this
//! crate owns everything between the two: the wire codec, the dispatch
//! table, the outbound queue, and the capability providers.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PERGOLA CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  Bridge                                                          │   │
//! │  │                                                                  │   │
//! │  │  message   - JSON wire codec (closed inbound enum, status frames)│   │
//! │  │  channel   - ready state + bounded pending outbound queue        │   │
//! │  │  dispatch  - tag → handler, one provider call, ≤1 response       │   │
//! │  └──────┬──────────────┬───────────────┬───────────────┬────────────┘   │
//! │         │              │               │               │                │
//! │  ┌──────▼─────┐ ┌──────▼─────┐ ┌───────▼────┐ ┌────────▼───┐            │
//! │  │   Camera   │ │  Location  │ │   Device   │ │   Store    │            │
//! │  │            │ │            │ │            │ │            │            │
//! │  │ - capture  │ │ - permission│ │ - platform │ │ - flat KV  │            │
//! │  │ - library  │ │ - one fix  │ │ - install  │ │ - last-    │            │
//! │  │ - facing   │ │ - suppress │ │   id       │ │   write-   │            │
//! │  │            │ │   on off   │ │            │ │   wins     │            │
//! │  └────────────┘ └────────────┘ └────────────┘ └────────────┘            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`bridge`] - Wire codec, dispatch, and the outbound channel
//! - [`capability`] - Camera, location, device identity, key/value store
//!
//! ## Concurrency Model
//!
//! One logical thread of control: the host serializes inbound frames and
//! capability completions into the bridge, so no two handlers run
//! concurrently and frames are processed in arrival order. Capability calls
//! are async and suspend the holding handler without blocking the host's
//! rendering thread.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod bridge;
pub mod capability;
pub mod error;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use bridge::message::{DeviceInfo, Inbound, LocationSample, Outbound, Platform};
pub use bridge::{Bridge, HostEvent, HostSink, NullHost};
pub use error::{Error, Result};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Pergola Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
