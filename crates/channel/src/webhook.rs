//! HTTP implementation of [`OutboundChannel`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;

use ho_domain::config::ChannelConfig;
use ho_domain::error::{Error, Result};

use crate::OutboundChannel;

/// Webhook-backed channel.
///
/// Only `send_message` carries a deadline; the request is cancelled when
/// it elapses.  `finish_conversation` runs without one, like every other
/// non-delivery remote call in this system.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    http: Client,
    send_url: String,
    finish_url: String,
    send_timeout: Duration,
}

impl WebhookChannel {
    pub fn new(cfg: &ChannelConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            send_url: cfg.send_url.clone(),
            finish_url: cfg.finish_url.clone(),
            send_timeout: Duration::from_secs(cfg.send_timeout_secs),
        })
    }
}

#[async_trait]
impl OutboundChannel for WebhookChannel {
    async fn send_message(
        &self,
        phone: &str,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let payload = serde_json::json!({
            "phone": phone,
            "message": text,
            "created_at": created_at,
        });

        let resp = self
            .http
            .post(&self.send_url)
            .timeout(self.send_timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::DeliveryTimeout {
                        seconds: self.send_timeout.as_secs(),
                    }
                } else {
                    Error::Http(format!("send: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::DeliveryRejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(status = %status, "delivery accepted by channel");
        Ok(())
    }

    async fn finish_conversation(&self, chat_id: i64) -> Result<()> {
        let resp = self
            .http
            .post(&self.finish_url)
            .json(&serde_json::json!({ "chat_id": chat_id }))
            .send()
            .await
            .map_err(|e| Error::Http(format!("finish: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http(format!("finish returned {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel_for(server: &MockServer, timeout_secs: u64) -> WebhookChannel {
        WebhookChannel::new(&ChannelConfig {
            send_url: format!("{}/send", server.uri()),
            finish_url: format!("{}/finish", server.uri()),
            send_timeout_secs: timeout_secs,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn send_posts_phone_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_partial_json(serde_json::json!({
                "phone": "+5511999990000",
                "message": "Hello",
            })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        channel_for(&server, 10)
            .send_message("+5511999990000", "Hello", Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_is_a_rejection_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = channel_for(&server, 10)
            .send_message("+551100", "Hello", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryRejected { status: 503 }), "{err}");
    }

    #[tokio::test]
    async fn slow_channel_times_out_distinctly() {
        let server = MockServer::start().await;
        // Responds well after the 1s deadline; the client must cancel
        // and report a timeout, not a generic failure.
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let err = channel_for(&server, 1)
            .send_message("+551100", "Hello", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeliveryTimeout { seconds: 1 }), "{err}");
    }

    #[tokio::test]
    async fn finish_posts_chat_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finish"))
            .and(body_partial_json(serde_json::json!({ "chat_id": 12 })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        channel_for(&server, 10).finish_conversation(12).await.unwrap();
    }
}
