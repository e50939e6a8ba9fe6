//! REST implementation of [`ChatStore`] over a PostgREST-style API.
//!
//! Filters, ordering and paging are expressed as query parameters
//! (`owner=eq.<id>`, `order=created_at.desc`, `offset`/`limit`); inserts
//! request the stored representation back so the caller learns the
//! store-assigned id.  No retry and no deadline: a slow store call simply
//! runs until it resolves (the console tolerates this by design).

use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

use ho_domain::config::StoreConfig;
use ho_domain::error::{Error, Result};

use crate::provider::ChatStore;
use crate::types::{ChatRow, MessageRow, NewMessageRow};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// REST-backed chat store.  Created once and reused; the underlying
/// `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestChatStore {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestChatStore {
    pub fn new(cfg: &StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }

    /// Decorate a request with the standard store headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb.header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.header("apikey", key).bearer_auth(key);
        }
        rb
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    /// Send a request and deserialize the body, mapping transport errors
    /// to [`Error::Http`] and non-success statuses to [`Error::Store`].
    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        rb: RequestBuilder,
    ) -> Result<T> {
        let resp = self
            .decorate(rb)
            .send()
            .await
            .map_err(|e| Error::Http(format!("{endpoint}: {e}")))?;

        let status = resp.status();
        tracing::debug!(endpoint, status = status.as_u16(), "store call");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!("{endpoint} returned {status}: {body}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::Store(format!("{endpoint}: invalid response body: {e}")))
    }
}

#[async_trait::async_trait]
impl ChatStore for RestChatStore {
    async fn list_chats(&self, owner: &str, offset: usize, limit: usize) -> Result<Vec<ChatRow>> {
        let rb = self.http.get(self.url("chats")).query(&[
            ("owner", format!("eq.{owner}")),
            ("bot_disabled", "eq.true".into()),
            ("status", "eq.open".into()),
            ("order", "created_at.desc".into()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.fetch("chats", rb).await
    }

    async fn last_message(&self, session_id: &str) -> Result<Option<MessageRow>> {
        let rb = self.http.get(self.url("messages")).query(&[
            ("session_id", format!("eq.{session_id}")),
            ("order", "created_at.desc".into()),
            ("limit", "1".into()),
        ]);
        let mut rows: Vec<MessageRow> = self.fetch("messages", rb).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn message_history(&self, session_id: &str) -> Result<Vec<MessageRow>> {
        let rb = self.http.get(self.url("messages")).query(&[
            ("session_id", format!("eq.{session_id}")),
            ("order", "created_at.asc".into()),
        ]);
        self.fetch("messages", rb).await
    }

    async fn insert_message(&self, row: NewMessageRow) -> Result<MessageRow> {
        let rb = self
            .http
            .post(self.url("messages"))
            .header("Prefer", "return=representation")
            .json(&row);
        let mut rows: Vec<MessageRow> = self.fetch("messages(insert)", rb).await?;
        if rows.is_empty() {
            return Err(Error::Store(
                "insert returned no representation".into(),
            ));
        }
        Ok(rows.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> RestChatStore {
        RestChatStore::new(&StoreConfig {
            base_url: server.uri(),
            api_key: Some("secret".into()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn list_chats_builds_visibility_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chats"))
            .and(query_param("owner", "eq.op-1"))
            .and(query_param("bot_disabled", "eq.true"))
            .and(query_param("status", "eq.open"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "20"))
            .and(header("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 3,
                "phone": "+5511999990000",
                "created_at": "2026-03-01T12:30:00Z",
                "bot_disabled": true,
                "status": "open"
            }])))
            .mount(&server)
            .await;

        let rows = store_for(&server).list_chats("op-1", 20, 20).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 3);
    }

    #[tokio::test]
    async fn last_message_is_none_on_empty_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let last = store_for(&server).last_message("+551100").await.unwrap();
        assert!(last.is_none());
    }

    #[tokio::test]
    async fn insert_returns_store_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 42,
                "session_id": "+5511999990000",
                "message": {"type": "ai", "content": "Hello",
                            "additional_kwargs": {}, "response_metadata": {}},
                "created_at": "2026-03-01T12:31:00Z"
            }])))
            .mount(&server)
            .await;

        let row = store_for(&server)
            .insert_message(NewMessageRow::new(
                "+5511999990000",
                json!({"type": "ai", "content": "Hello",
                       "additional_kwargs": {}, "response_metadata": {}}),
                chrono::Utc::now(),
            ))
            .await
            .unwrap();
        assert_eq!(row.id, 42);
    }

    #[tokio::test]
    async fn server_error_maps_to_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = store_for(&server)
            .message_history("+551100")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)), "{err}");
    }
}
