//! In-memory view of the operator's chat list and selected conversation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ho_store::types::ChatRow;

use crate::codec::Message;

/// Chats per fetched page.  An exact-size page signals more data may
/// exist; a short page ends pagination.
pub const PAGE_SIZE: usize = 20;

/// Preview shown for sessions with no decodable history.
pub const NO_MESSAGES_PREVIEW: &str = "No messages";

/// One chat session in the operator's list.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub id: i64,
    /// Durable routing key shared by store and channel.
    pub phone: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_preview: String,
    /// True exactly for sessions absent from the list at the moment of
    /// the fetch that introduced them; cleared on selection.
    pub is_new: bool,
}

impl ChatSession {
    pub fn from_row(row: ChatRow, preview: String, is_new: bool) -> Self {
        Self {
            id: row.id,
            phone: row.phone,
            name: row.name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            last_message_preview: preview,
            is_new,
        }
    }
}

/// The single per-operator view reconciled against the remote store.
///
/// Owned by the controller behind one async mutex; the lock is never
/// held across a store or channel await.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    /// Fetch order: most-recent-first by creation time.
    pub chats: Vec<ChatSession>,
    pub current_chat_id: Option<i64>,
    /// Messages of the selected chat, strictly ascending by id.
    pub messages: Vec<Message>,
    /// Zero-based pagination cursor.
    pub current_page: usize,
    pub has_more_chats: bool,
    /// Non-blocking pagination guard: a fetch while set is dropped.
    #[serde(skip)]
    pub is_loading_more: bool,
}
