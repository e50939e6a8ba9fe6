//! Wire-payload decoding for stored message records.
//!
//! The agent runtime writes each message as a JSON payload with a `type`
//! discriminator plus opaque kwargs/metadata maps.  Producers are not
//! under our control, so decoding is defensive: a record that fails any
//! shape check is rejected with a reason and dropped from the reconciled
//! view, never surfaced as an error.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ho_store::types::MessageRow;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Decoded message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Direction of a message relative to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Operator,
    Counterpart,
}

/// A decoded, display-ready message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Store-assigned id; the sole ordering and dedup key.
    pub id: i64,
    pub text: String,
    /// Local wall-clock send time, minute precision.
    pub timestamp: String,
    pub sender: Sender,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Rejection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why a stored record was dropped from the reconciled view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reject {
    /// The payload was string-encoded but not valid JSON.
    UnparsableJson(String),
    /// Missing field, non-object payload, or a field of the wrong shape.
    Malformed(String),
    /// The `type` discriminator was neither `human` nor `ai`.
    UnknownKind(String),
}

impl std::fmt::Display for Reject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reject::UnparsableJson(e) => write!(f, "unparsable payload: {e}"),
            Reject::Malformed(e) => write!(f, "malformed payload: {e}"),
            Reject::UnknownKind(kind) => write!(f, "unknown message type {kind:?}"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The payload contract with the agent runtime.  `additional_kwargs` and
/// `response_metadata` are tolerated but never interpreted.
#[derive(Debug, Deserialize)]
struct WirePayload {
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[allow(dead_code)]
    additional_kwargs: serde_json::Map<String, Value>,
    #[allow(dead_code)]
    response_metadata: serde_json::Map<String, Value>,
}

fn decode_payload(raw: &Value) -> Result<WirePayload, Reject> {
    // A still-string-encoded payload gets one parse pass first.
    let value: Value = match raw {
        Value::String(s) => {
            serde_json::from_str(s).map_err(|e| Reject::UnparsableJson(e.to_string()))?
        }
        other => other.clone(),
    };

    let payload: WirePayload =
        serde_json::from_value(value).map_err(|e| Reject::Malformed(e.to_string()))?;

    match payload.kind.as_str() {
        "human" | "ai" => Ok(payload),
        other => Err(Reject::UnknownKind(other.to_owned())),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public surface
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decode one stored record into a display-ready [`Message`].
pub fn decode(row: &MessageRow) -> Result<Message, Reject> {
    let payload = decode_payload(&row.message)?;
    let sender = if payload.kind == "human" {
        Sender::Counterpart
    } else {
        Sender::Operator
    };

    Ok(Message {
        id: row.id,
        text: payload.content,
        timestamp: display_time(row.created_at),
        sender,
    })
}

/// Content extraction for chat-list previews.  Decoding failures become
/// `None`; the caller substitutes its placeholder.
pub fn preview(row: &MessageRow) -> Option<String> {
    decode_payload(&row.message).ok().map(|p| p.content)
}

/// The payload written for an operator-authored message.
pub fn operator_payload(text: &str) -> Value {
    serde_json::json!({
        "type": "ai",
        "content": text,
        "additional_kwargs": {},
        "response_metadata": {},
    })
}

/// HH:MM in the process-local zone, truncated to minute precision.
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(message: Value) -> MessageRow {
        MessageRow {
            id: 1,
            session_id: "+5511999990000".into(),
            message,
            created_at: Utc::now(),
        }
    }

    fn valid(kind: &str) -> Value {
        json!({
            "type": kind,
            "content": "tudo bem?",
            "additional_kwargs": {},
            "response_metadata": {},
        })
    }

    #[test]
    fn human_maps_to_counterpart() {
        let m = decode(&row(valid("human"))).unwrap();
        assert_eq!(m.sender, Sender::Counterpart);
        assert_eq!(m.text, "tudo bem?");
    }

    #[test]
    fn ai_maps_to_operator() {
        let m = decode(&row(valid("ai"))).unwrap();
        assert_eq!(m.sender, Sender::Operator);
    }

    #[test]
    fn string_encoded_payload_is_parsed() {
        let encoded = Value::String(valid("human").to_string());
        let m = decode(&row(encoded)).unwrap();
        assert_eq!(m.sender, Sender::Counterpart);
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        let err = decode(&row(valid("system"))).unwrap_err();
        assert_eq!(err, Reject::UnknownKind("system".into()));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(matches!(
            decode(&row(json!(42))).unwrap_err(),
            Reject::Malformed(_)
        ));
        assert!(matches!(
            decode(&row(Value::Null)).unwrap_err(),
            Reject::Malformed(_)
        ));
    }

    #[test]
    fn missing_content_is_rejected() {
        let payload = json!({
            "type": "human",
            "additional_kwargs": {},
            "response_metadata": {},
        });
        assert!(matches!(
            decode(&row(payload)).unwrap_err(),
            Reject::Malformed(_)
        ));
    }

    #[test]
    fn non_object_kwargs_are_rejected() {
        let payload = json!({
            "type": "human",
            "content": "oi",
            "additional_kwargs": "nope",
            "response_metadata": {},
        });
        assert!(matches!(
            decode(&row(payload)).unwrap_err(),
            Reject::Malformed(_)
        ));
    }

    #[test]
    fn wrong_discriminator_type_is_rejected() {
        let payload = json!({
            "type": 7,
            "content": "oi",
            "additional_kwargs": {},
            "response_metadata": {},
        });
        assert!(matches!(
            decode(&row(payload)).unwrap_err(),
            Reject::Malformed(_)
        ));
    }

    #[test]
    fn garbage_string_is_unparsable() {
        let err = decode(&row(Value::String("not json".into()))).unwrap_err();
        assert!(matches!(err, Reject::UnparsableJson(_)));
    }

    #[test]
    fn preview_extracts_content_or_none() {
        assert_eq!(preview(&row(valid("human"))), Some("tudo bem?".into()));
        assert_eq!(preview(&row(json!("garbage"))), None);
    }

    #[test]
    fn operator_payload_round_trips_through_decode() {
        let m = decode(&row(operator_payload("Hello"))).unwrap();
        assert_eq!(m.sender, Sender::Operator);
        assert_eq!(m.text, "Hello");
    }
}
