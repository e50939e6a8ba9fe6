//! Periodic refresh of the view against the remote store.
//!
//! One task, one cadence: each tick reloads the chat list (a fresh load,
//! so `is_new` is judged against the previous snapshot) and incrementally
//! reconciles the active conversation.  Exactly one poller is expected
//! per process; racing incremental fetches are last-write-wins.

use std::sync::Arc;
use std::time::Duration;

use ho_console::ConsoleController;

/// Spawn the refresh loop.  A `poll_secs` of 0 disables polling.
pub fn spawn(controller: Arc<ConsoleController>, poll_secs: u64) -> Option<tokio::task::JoinHandle<()>> {
    if poll_secs == 0 {
        tracing::warn!("polling disabled; the view only refreshes on demand");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(poll_secs));
        // The first tick fires immediately; skip it, serve() already did
        // the initial load.
        interval.tick().await;

        loop {
            interval.tick().await;

            controller.fetch_chats(false).await;

            let current = controller.snapshot().await.current_chat_id;
            if let Some(chat_id) = current {
                if let Err(e) = controller.fetch_messages(chat_id, true).await {
                    tracing::warn!(chat_id, error = %e, "incremental refresh failed");
                }
            }
        }
    }))
}
