use std::fmt;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message store connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store's REST API (PostgREST-style).
    #[serde(default)]
    pub base_url: String,
    /// API key sent as both `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound channel (messaging webhook)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Endpoint receiving `{ phone, message, created_at }`.
    #[serde(default)]
    pub send_url: String,
    /// Endpoint receiving `{ chat_id }` on handoff-back.
    #[serde(default)]
    pub finish_url: String,
    /// Deadline for one delivery attempt.  The send is cancelled when it
    /// elapses; there is no deadline on any other remote call.
    #[serde(default = "d_10")]
    pub send_timeout_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            send_url: String::new(),
            finish_url: String::new(),
            send_timeout_secs: d_10(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// API server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    /// Environment variable holding the API bearer token.  If the env var
    /// is unset, the API allows unauthenticated access (dev mode).
    #[serde(default = "d_token_env")]
    pub api_token_env: String,
    #[serde(default = "d_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
            api_token_env: d_token_env(),
            allowed_origins: d_origins(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Operator scope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperatorConfig {
    /// Owner id scoping the chat list filter.
    #[serde(default)]
    pub owner_id: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sync cadence
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between refresh ticks (chat list + active conversation).
    #[serde(default = "d_5")]
    pub poll_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { poll_secs: d_5() }
    }
}

// ── serde defaults ───────────────────────────────────────────────────

fn d_10() -> u64 {
    10
}

fn d_5() -> u64 {
    5
}

fn d_host() -> String {
    "127.0.0.1".into()
}

fn d_port() -> u16 {
    8090
}

fn d_token_env() -> String {
    "HO_API_TOKEN".into()
}

fn d_origins() -> Vec<String> {
    vec!["*".into()]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.store.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "store.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        if self.channel.send_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "channel.send_url".into(),
                message: "send_url must not be empty".into(),
            });
        }

        if self.channel.finish_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "channel.finish_url".into(),
                message: "finish_url must not be empty".into(),
            });
        }

        if self.channel.send_timeout_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "channel.send_timeout_secs".into(),
                message: "delivery deadline must be greater than 0".into(),
            });
        }

        if self.operator.owner_id.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "operator.owner_id".into(),
                message: "owner_id must not be empty (scopes the chat list)".into(),
            });
        }

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.sync.poll_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "sync.poll_secs".into(),
                message: "poll disabled; the view only refreshes on demand".into(),
            });
        }

        if self.server.allowed_origins.len() == 1 && self.server.allowed_origins[0] == "*" {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)"
                    .into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        toml::from_str(
            r#"
            [store]
            base_url = "https://store.example.com/rest/v1"
            api_key = "key"

            [channel]
            send_url = "https://hooks.example.com/send"
            finish_url = "https://hooks.example.com/finish"

            [operator]
            owner_id = "op-1"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_in() {
        let cfg = valid_config();
        assert_eq!(cfg.channel.send_timeout_secs, 10);
        assert_eq!(cfg.sync.poll_secs, 5);
        assert_eq!(cfg.server.port, 8090);
    }

    #[test]
    fn valid_config_has_no_errors() {
        let errors: Vec<_> = valid_config()
            .validate()
            .into_iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn empty_config_reports_missing_endpoints() {
        let issues = Config::default().validate();
        let fields: Vec<_> = issues.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"store.base_url"));
        assert!(fields.contains(&"channel.send_url"));
        assert!(fields.contains(&"channel.finish_url"));
        assert!(fields.contains(&"operator.owner_id"));
    }
}
