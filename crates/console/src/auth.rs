//! Operator identity, consulted to scope the chat list; never owned.

use async_trait::async_trait;

use ho_domain::error::{Error, Result};

/// Source of the operator identity used as the chat-list owner filter.
#[async_trait]
pub trait OperatorAuth: Send + Sync {
    async fn operator_id(&self) -> Result<String>;
}

/// Config-backed identity for single-operator deployments.
pub struct StaticOperator(pub String);

#[async_trait]
impl OperatorAuth for StaticOperator {
    async fn operator_id(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(Error::Auth("no operator identity configured".into()));
        }
        Ok(self.0.clone())
    }
}
