//! The chat synchronization engine.
//!
//! One `ConsoleController` owns the per-operator [`ViewState`] and keeps
//! it consistent with the remote store, which the automated agent, this
//! operator and other operator sessions all mutate concurrently.  Store
//! and channel calls run outside the state lock, so user actions can
//! interleave with any fetch.
//!
//! Failure policy is deliberately asymmetric: list/pagination and
//! handoff-back failures are swallowed (log, abort, state untouched),
//! while message-stream and send failures are returned to the caller so
//! the UI can offer an accurate retry for the active conversation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future;
use tokio::sync::{broadcast, Mutex};

use ho_channel::OutboundChannel;
use ho_domain::error::Result;
use ho_store::types::{ChatRow, MessageRow, NewMessageRow};
use ho_store::ChatStore;

use crate::auth::OperatorAuth;
use crate::codec::{self, Message, Sender};
use crate::events::ConsoleEvent;
use crate::state::{ChatSession, ViewState, NO_MESSAGES_PREVIEW, PAGE_SIZE};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Controller
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ConsoleController {
    store: Arc<dyn ChatStore>,
    channel: Arc<dyn OutboundChannel>,
    auth: Arc<dyn OperatorAuth>,
    state: Mutex<ViewState>,
    event_tx: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleController {
    pub fn new(
        store: Arc<dyn ChatStore>,
        channel: Arc<dyn OutboundChannel>,
        auth: Arc<dyn OperatorAuth>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            store,
            channel,
            auth,
            state: Mutex::new(ViewState::default()),
            event_tx,
        }
    }

    /// A point-in-time copy of the view, for the UI layer.
    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.event_tx.subscribe()
    }

    // ── Chat list pagination ─────────────────────────────────────────

    /// Load a page of eligible chats into the view.
    ///
    /// `load_more == false` replaces the list (mount or manual refresh);
    /// `load_more == true` appends the next page.  Failures are logged
    /// and swallowed: the list simply does not advance.
    pub async fn fetch_chats(&self, load_more: bool) {
        let (offset, known_ids) = {
            let mut st = self.state.lock().await;
            if st.is_loading_more {
                tracing::debug!("chat page fetch already in flight, dropping call");
                return;
            }
            st.is_loading_more = true;

            // `is_new` is judged against the list as it stood before this
            // fetch mutates it, including for a fresh reload, so sessions
            // reappearing after a refresh are not re-flagged.
            let known_ids: HashSet<i64> = st.chats.iter().map(|c| c.id).collect();
            let offset = if load_more {
                st.current_page * PAGE_SIZE
            } else {
                st.chats.clear();
                st.current_page = 0;
                0
            };
            (offset, known_ids)
        };

        let result = self.fetch_page(offset).await;

        let mut st = self.state.lock().await;
        match result {
            Ok(page) => {
                let page_len = page.len();
                let mut new_ids = Vec::new();
                for (row, preview) in page {
                    let is_new = !known_ids.contains(&row.id);
                    // Page ranges shift when rows are inserted while we
                    // paginate; never let a session appear twice.
                    if load_more && st.chats.iter().any(|c| c.id == row.id) {
                        continue;
                    }
                    if is_new {
                        new_ids.push(row.id);
                    }
                    st.chats.push(ChatSession::from_row(row, preview, is_new));
                }

                if load_more {
                    st.current_page += 1;
                } else {
                    st.current_page = 1;
                }
                st.has_more_chats = page_len == PAGE_SIZE;

                if !new_ids.is_empty() {
                    tracing::info!(count = new_ids.len(), "new chats appeared");
                    let _ = self.event_tx.send(ConsoleEvent::NewChats { chat_ids: new_ids });
                }
            }
            Err(e) => {
                tracing::error!(error = %e, load_more, "chat page fetch failed");
            }
        }
        st.is_loading_more = false;
    }

    /// Fetch one page of chats plus a preview for each entry.
    async fn fetch_page(&self, offset: usize) -> Result<Vec<(ChatRow, String)>> {
        let owner = self.auth.operator_id().await?;
        let rows = self.store.list_chats(&owner, offset, PAGE_SIZE).await?;

        // Preview lookups fan out concurrently; join_all hands the
        // results back in page order, not completion order.
        let lookups = rows.iter().map(|row| self.store.last_message(&row.phone));
        let results = future::join_all(lookups).await;

        let mut page = Vec::with_capacity(rows.len());
        for (row, last) in rows.into_iter().zip(results) {
            let preview = last?
                .as_ref()
                .and_then(codec::preview)
                .unwrap_or_else(|| NO_MESSAGES_PREVIEW.to_owned());
            page.push((row, preview));
        }
        Ok(page)
    }

    // ── Message stream synchronization ───────────────────────────────

    /// Synchronize the message stream for `chat_id`.
    ///
    /// `append_new == false` replaces the sequence (chat selection);
    /// `append_new == true` appends only records with an id above the
    /// highest already held, leaving existing entries untouched.
    pub async fn fetch_messages(&self, chat_id: i64, append_new: bool) -> Result<()> {
        let phone = {
            let st = self.state.lock().await;
            match st.chats.iter().find(|c| c.id == chat_id) {
                Some(chat) => chat.phone.clone(),
                None => {
                    tracing::error!(chat_id, "cannot fetch messages: chat not in list");
                    return Ok(());
                }
            }
        };

        let rows = self.store.message_history(&phone).await.map_err(|e| {
            tracing::error!(chat_id, error = %e, "message history fetch failed");
            e
        })?;

        let decoded = decode_all(&rows);

        let mut st = self.state.lock().await;
        if append_new {
            let last_existing_id = st.messages.last().map(|m| m.id).unwrap_or(0);
            st.messages
                .extend(decoded.into_iter().filter(|m| m.id > last_existing_id));
        } else {
            st.messages = decoded;
        }
        Ok(())
    }

    // ── Outbound pipeline ────────────────────────────────────────────

    /// Deliver, record, then reflect one operator message for the
    /// selected chat.
    ///
    /// Returns the store-assigned id, or `None` when a precondition made
    /// the call a no-op.  The steps are strictly sequential: the store
    /// never sees a message the counterpart did not receive, and the view
    /// never shows a message the store did not record.  A delivery that
    /// succeeds but fails to record is lost to history; there is no
    /// compensating action.
    pub async fn send_message(&self, text: &str) -> Result<Option<i64>> {
        let text = text.trim();
        if text.is_empty() {
            tracing::warn!("dropping empty outbound message");
            return Ok(None);
        }

        let (chat_id, phone) = {
            let st = self.state.lock().await;
            let Some(chat_id) = st.current_chat_id else {
                tracing::warn!("no chat selected, dropping outbound message");
                return Ok(None);
            };
            match st.chats.iter().find(|c| c.id == chat_id) {
                Some(chat) => (chat_id, chat.phone.clone()),
                None => {
                    tracing::warn!(chat_id, "selected chat left the list, dropping outbound message");
                    return Ok(None);
                }
            }
        };

        // Channel and store record the same send time.
        let created_at = Utc::now();

        // Step 1: external delivery, under the channel's deadline.
        self.channel
            .send_message(&phone, text, created_at)
            .await
            .map_err(|e| {
                tracing::error!(chat_id, error = %e, "outbound delivery failed");
                e
            })?;

        // Step 2: durable record, returning the store-assigned id.
        let row = self
            .store
            .insert_message(NewMessageRow::new(
                &phone,
                codec::operator_payload(text),
                created_at,
            ))
            .await
            .map_err(|e| {
                tracing::error!(chat_id, error = %e, "message delivered but not recorded");
                e
            })?;

        // Step 3: local reflection.
        let mut st = self.state.lock().await;
        st.messages.push(Message {
            id: row.id,
            text: text.to_owned(),
            timestamp: codec::display_time(created_at),
            sender: Sender::Operator,
        });

        Ok(Some(row.id))
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Make `chat_id` the active conversation and load its full history.
    pub async fn set_current_chat(&self, chat_id: i64) -> Result<()> {
        {
            let mut st = self.state.lock().await;
            st.current_chat_id = Some(chat_id);
            if let Some(chat) = st.chats.iter_mut().find(|c| c.id == chat_id) {
                chat.is_new = false;
            }
        }
        self.fetch_messages(chat_id, false).await
    }

    /// Hand `chat_id` back to the automated agent and drop it from the
    /// view.  On failure the view is left untouched; retrying is the
    /// operator's call.
    pub async fn close_chat(&self, chat_id: i64) {
        if let Err(e) = self.channel.finish_conversation(chat_id).await {
            tracing::error!(chat_id, error = %e, "finish-conversation call failed");
            return;
        }

        let _ = self
            .event_tx
            .send(ConsoleEvent::ConversationFinished { chat_id });

        let next = {
            let mut st = self.state.lock().await;
            st.chats.retain(|c| c.id != chat_id);

            if st.current_chat_id != Some(chat_id) {
                None
            } else if let Some(first) = st.chats.first() {
                Some(first.id)
            } else {
                st.current_chat_id = None;
                st.messages.clear();
                None
            }
        };

        if let Some(next_id) = next {
            if let Err(e) = self.set_current_chat(next_id).await {
                tracing::error!(chat_id = next_id, error = %e, "loading next chat after close failed");
            }
        }
    }
}

/// Decode records in order, dropping the undecodable ones.
fn decode_all(rows: &[MessageRow]) -> Vec<Message> {
    rows.iter()
        .filter_map(|row| match codec::decode(row) {
            Ok(m) => Some(m),
            Err(reject) => {
                tracing::debug!(id = row.id, %reject, "dropping undecodable message record");
                None
            }
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
