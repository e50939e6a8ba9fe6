/// Shared error type used across all Handover crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("store: {0}")]
    Store(String),

    #[error("delivery timed out after {seconds}s")]
    DeliveryTimeout { seconds: u64 },

    #[error("delivery rejected: channel returned {status}")]
    DeliveryRejected { status: u16 },

    #[error("auth: {0}")]
    Auth(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable machine-readable tag for API consumers.  The UI uses this
    /// to pick an accurate retry prompt (timeout vs rejected vs storage).
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Http(_) => "http",
            Error::Store(_) => "store",
            Error::DeliveryTimeout { .. } => "delivery_timeout",
            Error::DeliveryRejected { .. } => "delivery_rejected",
            Error::Auth(_) => "auth",
            Error::Config(_) => "config",
            Error::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
