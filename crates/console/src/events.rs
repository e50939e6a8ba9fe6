//! Events the controller emits for the UI layer.
//!
//! The core stays free of presentation concerns: the notification sound
//! and the close celebration are UI reactions to these events, delivered
//! over the gateway's SSE bridge.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// Sessions appeared that were not in the list before.
    NewChats { chat_ids: Vec<i64> },
    /// A conversation was handed back to the automated agent.
    ConversationFinished { chat_id: i64 },
}
