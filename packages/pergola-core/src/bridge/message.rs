//! Wire messages exchanged with the embedded page.
//!
//! Every message is one UTF-8 JSON document. Inbound frames carry an
//! `action` tag (`type` is accepted as a legacy alias still emitted by older
//! page builds); outbound frames are always
//! `{ "status": string, "content"?: any, "message"?: string }`.
//!
//! Inbound tags form a closed enumeration: adding a capability means adding
//! a variant here and a handler arm in the dispatcher. Frames with a tag
//! outside the enumeration decode to `None` and are dropped silently; an
//! unknown tag is protocol evolution, not malformance.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Canonical tag field on inbound frames.
pub const TAG_FIELD: &str = "action";

/// Legacy tag field alias accepted on decode.
pub const TAG_FIELD_ALIAS: &str = "type";

/// Fixed notice attached to `sendDeviceInfo` frames.
pub const MSG_DEVICE_INFO: &str = "傳送裝置資訊";

/// Fixed notice attached to `saved` frames.
pub const MSG_TOKEN_SAVED: &str = "Token 已儲存";

/// Fixed notice attached to `sendPhoto` frames.
pub const MSG_SEND_PHOTO: &str = "傳送照片";

/// One GPS fix as delivered to the page.
///
/// Consumed exactly once per request; never cached across a disable/enable
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Platform discriminant reported in [`DeviceInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android devices.
    Android,
    /// iOS devices.
    Ios,
    /// Anything else (desktop, simulators).
    Other,
}

/// Device identity snapshot pushed to the page as `sendDeviceInfo`.
///
/// The wire field names are the published page contract and are kept
/// verbatim, including the `plateformOS` spelling the deployed page reads.
/// A missing identifier serializes as JSON `null`, never the string
/// `"null"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Platform discriminant.
    #[serde(rename = "plateformOS")]
    pub platform: Platform,
    /// OS version string as reported by the host.
    #[serde(rename = "osVersion")]
    pub os_version: String,
    /// Device model name as reported by the host.
    #[serde(rename = "osModelName")]
    pub model_name: String,
    /// Stable installation identifier, when the platform allows the lookup.
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

// ============================================================================
// INBOUND
// ============================================================================

/// Inbound frames from the page, normalized to one internal shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `openCamera` / `OPEN_CAMERA_FROM_WEB` — request native camera UI
    /// take-over.
    OpenCamera,
    /// `SEND_PHOTO` — a page-captured image (base64 data URL) to persist to
    /// the photo library.
    SendPhoto {
        /// The image payload as a base64 data URL.
        photo_url: String,
    },
    /// `getPlatformInfo` — request the device identity snapshot.
    GetPlatformInfo,
    /// `saveToken` — persist an auth token.
    SaveToken {
        /// The token value from `payload.token`.
        token: String,
    },
    /// `GET_INIT_LOCATION` — enable location and deliver an initial fix.
    EnableLocation,
    /// `UPDATE_LOCATION` — refresh the fix while location is enabled.
    RefreshLocation,
    /// `GPS_OFF` — disable location and clear any cached sample.
    DisableLocation,
    /// `REQUEST_LOCATION` — one-shot fix, independent of the toggle.
    RequestLocation,
}

impl Inbound {
    /// Decode one wire frame.
    ///
    /// `Ok(None)` means a well-formed frame whose tag is not in the closed
    /// enumeration; callers drop those without surfacing an error.
    pub fn decode(raw: &str) -> Result<Option<Inbound>> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::MalformedMessage(format!("invalid JSON: {e}")))?;

        let tag = value
            .get(TAG_FIELD)
            .and_then(Value::as_str)
            .or_else(|| value.get(TAG_FIELD_ALIAS).and_then(Value::as_str))
            .ok_or(Error::MissingTag)?;

        let inbound = match tag {
            "openCamera" | "OPEN_CAMERA_FROM_WEB" => Inbound::OpenCamera,
            "SEND_PHOTO" => Inbound::SendPhoto {
                photo_url: require_str(&value, "photoUrl")?.to_string(),
            },
            "getPlatformInfo" => Inbound::GetPlatformInfo,
            "saveToken" => {
                let token = value
                    .pointer("/payload/token")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        Error::MalformedMessage("saveToken without payload.token".into())
                    })?;
                Inbound::SaveToken {
                    token: token.to_string(),
                }
            }
            "GET_INIT_LOCATION" => Inbound::EnableLocation,
            "UPDATE_LOCATION" => Inbound::RefreshLocation,
            "GPS_OFF" => Inbound::DisableLocation,
            "REQUEST_LOCATION" => Inbound::RequestLocation,
            _ => return Ok(None),
        };

        Ok(Some(inbound))
    }
}

fn require_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MalformedMessage(format!("missing {field}")))
}

// ============================================================================
// OUTBOUND
// ============================================================================

/// Outbound frames to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// `sendDeviceInfo` — device identity snapshot.
    DeviceInfo(DeviceInfo),
    /// `saved` — the auth token was persisted.
    TokenSaved,
    /// `error` — a capability failure relayed to the page.
    Error {
        /// Human-readable failure description.
        message: String,
    },
    /// `sendPhoto` — unsolicited push announcing a fresh capture.
    Photo {
        /// The capture rendition under the active delivery policy
        /// (library URI or inline data URL).
        content: String,
    },
    /// `LOCATION_INFO` — solicited fix.
    LocationFix(LocationSample),
    /// `UPDATE_LOCATION` — refresh push.
    LocationUpdate(LocationSample),
}

impl Outbound {
    /// The `status` tag this frame carries on the wire.
    pub fn status(&self) -> &'static str {
        match self {
            Outbound::DeviceInfo(_) => "sendDeviceInfo",
            Outbound::TokenSaved => "saved",
            Outbound::Error { .. } => "error",
            Outbound::Photo { .. } => "sendPhoto",
            Outbound::LocationFix(_) => "LOCATION_INFO",
            Outbound::LocationUpdate(_) => "UPDATE_LOCATION",
        }
    }

    /// Render the `{status, content?, message?}` wire form.
    pub fn encode(&self) -> Result<String> {
        let frame = match self {
            Outbound::DeviceInfo(info) => serde_json::json!({
                "status": self.status(),
                "content": info,
                "message": MSG_DEVICE_INFO,
            }),
            Outbound::TokenSaved => serde_json::json!({
                "status": self.status(),
                "message": MSG_TOKEN_SAVED,
            }),
            Outbound::Error { message } => serde_json::json!({
                "status": self.status(),
                "message": message,
            }),
            Outbound::Photo { content } => serde_json::json!({
                "status": self.status(),
                "content": content,
                "message": MSG_SEND_PHOTO,
            }),
            Outbound::LocationFix(sample) | Outbound::LocationUpdate(sample) => {
                serde_json::json!({
                    "status": self.status(),
                    "content": sample,
                })
            }
        };
        serde_json::to_string(&frame).map_err(Error::from)
    }
}

// ============================================================================
// TESTS
// ============================================================================
