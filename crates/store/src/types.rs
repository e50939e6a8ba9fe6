//! Row types matching the handoff store's REST schema.
//!
//! Two logical tables back the console: `chats` (one row per session,
//! keyed externally by `phone`) and `messages` (one row per stored
//! message, keyed by `session_id` = the session's phone). The `message`
//! column is an opaque JSON payload produced by the agent runtime; this
//! crate stores and returns it untouched; decoding lives in the console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat rows
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Open,
    Closed,
}

/// One chat session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRow {
    pub id: i64,
    /// Durable routing key shared with the external channel.
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub bot_disabled: bool,
    pub status: ChatStatus,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message rows
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One stored message row.  `message` may be a JSON object or a
/// string-encoded JSON object; producers are not under our control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub session_id: String,
    pub message: Value,
    pub created_at: DateTime<Utc>,
}

/// A message row to insert (id is store-assigned).
#[derive(Debug, Clone, Serialize)]
pub struct NewMessageRow {
    pub session_id: String,
    pub message: Value,
    pub created_at: DateTime<Utc>,
}

impl NewMessageRow {
    pub fn new(session_id: impl Into<String>, message: Value, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            message,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_row_roundtrip() {
        let raw = r#"{
            "id": 7,
            "phone": "+5511999990000",
            "name": "Ana",
            "created_at": "2026-03-01T12:30:00Z",
            "bot_disabled": true,
            "status": "open"
        }"#;
        let row: ChatRow = serde_json::from_str(raw).unwrap();
        assert_eq!(row.status, ChatStatus::Open);
        assert!(row.bot_disabled);
        assert_eq!(row.avatar_url, None);
    }

    #[test]
    fn message_row_accepts_string_payload() {
        let raw = r#"{
            "id": 1,
            "session_id": "+5511999990000",
            "message": "{\"type\":\"human\",\"content\":\"oi\"}",
            "created_at": "2026-03-01T12:30:00Z"
        }"#;
        let row: MessageRow = serde_json::from_str(raw).unwrap();
        assert!(row.message.is_string());
    }
}
