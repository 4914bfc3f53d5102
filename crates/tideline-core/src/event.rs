//! Event types for conversation timelines.
//!
//! A [`RawEvent`] is one record in a conversation transcript: a message, a
//! tool call, or a status line. Events are immutable once created; a later
//! event carrying the same id supersedes the earlier one (edit-in-place) and
//! is applied by [`crate::store::EventStore::upsert`] as a replace, never an
//! insert.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, unique identifier for an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
    System,
}

/// Payload variants for a timeline event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Conversation message
    Message { role: Role, text: String },

    /// Tool invocation, with output once the call has completed
    ToolCall {
        name: String,
        arguments: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },

    /// Agent status line (thinking, queued, interrupted, ...)
    Status { text: String },
}

/// One record in the conversation, as decoded by the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: EventId,
    /// Position in the conversation's total order
    pub sequence: u64,
    /// Turn marker; consecutive events sharing one collapse into a group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    pub payload: EventPayload,
}

impl RawEvent {
    pub fn message(id: impl Into<EventId>, sequence: u64, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence,
            turn_id: None,
            payload: EventPayload::Message {
                role,
                text: text.into(),
            },
        }
    }

    pub fn with_turn(mut self, turn_id: impl Into<String>) -> Self {
        self.turn_id = Some(turn_id.into());
        self
    }

    /// Short human-readable label, used by fallback rendering and logs
    pub fn label(&self) -> &str {
        match &self.payload {
            EventPayload::Message { text, .. } | EventPayload::Status { text } => text,
            EventPayload::ToolCall { name, .. } => name,
        }
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Mint a fresh event id
pub fn generate_event_id() -> EventId {
    EventId(ulid::Ulid::new().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_serde_round_trip() {
        let event = RawEvent {
            id: EventId::new("ev-1"),
            sequence: 7,
            turn_id: Some("turn-1".to_string()),
            payload: EventPayload::ToolCall {
                name: "bash".to_string(),
                arguments: serde_json::json!({"command": "ls"}),
                output: Some("Cargo.toml\nsrc".to_string()),
            },
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: RawEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_turn_id_omitted_when_absent() {
        let event = RawEvent::message("ev-1", 0, Role::User, "hi");
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("turn_id"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_event_id();
        let b = generate_event_id();
        assert_ne!(a, b);
    }
}
