//! Wire envelope for frames exchanged over live connections.
//!
//! Every frame is a JSON object `{type, room_id, user_id, payload}`. The
//! frame kind is a closed enum so adding a new kind is a compile-time-checked
//! change; anything a peer sends with an unrecognized tag deserializes to
//! [`FrameKind::Unknown`] and is ignored by the hub rather than treated as an
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    ChatMessage,
    ParticipantJoined,
    ParticipantLeft,
    /// Opaque signaling payload, relayed verbatim to the room.
    Signal,
    /// Forward-compatible no-op for tags this server does not know.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: FrameKind,
    pub room_id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Envelope {
    pub fn participant_joined(room_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::ParticipantJoined,
            room_id: room_id.into(),
            user_id: user_id.into(),
            payload: Value::Null,
        }
    }

    pub fn participant_left(room_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::ParticipantLeft,
            room_id: room_id.into(),
            user_id: user_id.into(),
            payload: Value::Null,
        }
    }

    pub fn chat(
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            kind: FrameKind::ChatMessage,
            room_id: room_id.into(),
            user_id: user_id.into(),
            payload,
        }
    }

    /// Extract `(message, user_name)` from a chat frame's payload body.
    pub fn chat_body(&self) -> Option<(&str, &str)> {
        let message = self.payload.get("message")?.as_str()?;
        let user_name = self.payload.get("user_name")?.as_str()?;
        Some((message, user_name))
    }
}
