//! Shared wire model for the whiteboard relay and event-log API.
//!
//! This crate owns the JSON representation used by `server`, `canvas`, and
//! `cli`. Shape payloads stay opaque here (`message` is JSON text produced by
//! the canvas shape model), so the relay can forward and persist them without
//! understanding every shape variant.
//!
//! WIRE FORMAT
//! ===========
//! ```json
//! { "type": "join_room", "roomId": "42" }
//! { "type": "chat", "roomId": "42", "message": "{\"shape\":{...}}" }
//! { "type": "shape_deleted", "roomId": "42", "shapeId": "..." }
//! ```
//! Unrecognized `type` values decode to [`RelayMessage::Unknown`] so callers
//! can ignore them without treating the frame as malformed.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error returned by [`decode_message`] and [`encode_message`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a JSON object carrying a string `type` field.
    #[error("failed to decode relay message: {0}")]
    Decode(#[source] serde_json::Error),
    /// The message could not be rendered as JSON.
    #[error("failed to encode relay message: {0}")]
    Encode(#[source] serde_json::Error),
}

// =============================================================================
// ROOM ID
// =============================================================================

/// Room identifier as it appears on the wire.
///
/// Older peers send numeric room ids; both forms normalize to a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoomIdVisitor;

        impl Visitor<'_> for RoomIdVisitor {
            type Value = RoomId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a room id string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RoomId, E> {
                Ok(RoomId(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<RoomId, E> {
                Ok(RoomId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }
        }

        deserializer.deserialize_any(RoomIdVisitor)
    }
}

// =============================================================================
// RELAY MESSAGES
// =============================================================================

/// A single message on the real-time relay channel.
///
/// The same type is used in both directions. Inbound copies relayed from a
/// peer may omit `roomId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Subscribe this connection to a room. Sent once after connect.
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Shape creation broadcast. `message` is JSON text of `{ "shape": ... }`.
    Chat {
        #[serde(rename = "roomId", default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        message: String,
    },
    /// Shape deletion broadcast.
    ShapeDeleted {
        #[serde(rename = "roomId", default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        #[serde(rename = "shapeId")]
        shape_id: String,
    },
    /// Any other `type`. Receivers ignore it.
    #[serde(other)]
    Unknown,
}

impl RelayMessage {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join_room",
            Self::Chat { .. } => "chat",
            Self::ShapeDeleted { .. } => "shape_deleted",
            Self::Unknown => "unknown",
        }
    }

    /// Room the message is addressed to, if it names one.
    #[must_use]
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::JoinRoom { room_id } => Some(room_id),
            Self::Chat { room_id, .. } | Self::ShapeDeleted { room_id, .. } => room_id.as_ref(),
            Self::Unknown => None,
        }
    }
}

/// Encode a relay message as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_message(message: &RelayMessage) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Encode)
}

/// Decode JSON text into a relay message.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for invalid JSON, a missing `type`, or a
/// known `type` with missing/invalid fields.
pub fn decode_message(text: &str) -> Result<RelayMessage, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}

// =============================================================================
// EVENT LOG (HTTP)
// =============================================================================

/// One persisted relay event. Extra columns sent by the store are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// JSON text of `{ "shape": ... }`, exactly as broadcast.
    pub message: String,
}

/// Body of `GET /rooms/{room_id}/events`, oldest event first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(default)]
    pub messages: Vec<EventRecord>,
}

/// Body of `DELETE /rooms/{room_id}/shapes/{shape_id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Extract `shape.id` from a persisted event message without decoding the
/// full shape. Returns `None` for anything that is not `{ "shape": { "id": .. } }`.
#[must_use]
pub fn shape_id_of(message: &str) -> Option<String> {
    let value: Value = serde_json::from_str(message).ok()?;
    value
        .get("shape")?
        .get("id")?
        .as_str()
        .map(str::to_owned)
}

// =============================================================================
// PATHS
// =============================================================================

/// Path of the persisted event log for a room.
#[must_use]
pub fn events_path(room_id: &RoomId) -> String {
    format!("/rooms/{room_id}/events")
}

/// Path used to delete one persisted shape.
#[must_use]
pub fn shape_path(room_id: &RoomId, shape_id: &str) -> String {
    format!("/rooms/{room_id}/shapes/{shape_id}")
}

/// Path of the relay websocket, carrying the bearer credential as a query parameter.
#[must_use]
pub fn ws_path(token: &str) -> String {
    format!("/ws?token={token}")
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
