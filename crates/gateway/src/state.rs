use std::sync::Arc;

use ho_console::ConsoleController;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConsoleController>,
    /// SHA-256 of the API bearer token; `None` in dev mode (no token
    /// configured), which allows unauthenticated access.
    pub api_token_hash: Option<Vec<u8>>,
}

impl AppState {
    /// Read the token from the env var named in config and cache its
    /// digest once at startup.
    pub fn new(controller: Arc<ConsoleController>, token_env: &str) -> Self {
        use sha2::{Digest, Sha256};

        let api_token_hash = match std::env::var(token_env) {
            Ok(token) if !token.is_empty() => Some(Sha256::digest(token.as_bytes()).to_vec()),
            _ => {
                tracing::warn!(
                    env = token_env,
                    "no API token configured — API is unauthenticated"
                );
                None
            }
        };

        Self {
            controller,
            api_token_hash,
        }
    }
}
