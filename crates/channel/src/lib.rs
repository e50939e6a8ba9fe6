//! The outbound messaging channel: the webhook that actually reaches
//! the counterpart, and the handoff-back endpoint.
//!
//! Delivery is fire-and-confirm: a success response means the channel
//! accepted the message, nothing more.  There is no dedup token, so a
//! send must never be retried blindly.

pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ho_domain::error::Result;

pub use webhook::WebhookChannel;

/// Abstraction over the external channel (webhook or test double).
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    /// Deliver one operator-authored message to the counterpart.
    ///
    /// Must resolve within the configured deadline; an elapsed deadline
    /// surfaces as [`ho_domain::Error::DeliveryTimeout`] and a non-success
    /// response as [`ho_domain::Error::DeliveryRejected`].
    async fn send_message(&self, phone: &str, text: &str, created_at: DateTime<Utc>)
        -> Result<()>;

    /// Hand the conversation back to the automated agent.
    async fn finish_conversation(&self, chat_id: i64) -> Result<()>;
}
