//! The `ChatStore` trait defines the interface to the shared message
//! store (REST backend or test double).

use async_trait::async_trait;
use ho_domain::error::Result;

use crate::types::{ChatRow, MessageRow, NewMessageRow};

/// Abstraction over the handoff store's API surface.
///
/// Implementations may talk to the real REST API or a test double.
/// All methods return `ho_domain::error::Result`.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// One page of open, human-operated chats for `owner`, newest first.
    async fn list_chats(&self, owner: &str, offset: usize, limit: usize) -> Result<Vec<ChatRow>>;

    /// The most recent message row for a session key, if any.
    async fn last_message(&self, session_id: &str) -> Result<Option<MessageRow>>;

    /// The full message history for a session key, oldest first.
    async fn message_history(&self, session_id: &str) -> Result<Vec<MessageRow>>;

    /// Insert a message row and return the stored row with its id.
    async fn insert_message(&self, row: NewMessageRow) -> Result<MessageRow>;
}
