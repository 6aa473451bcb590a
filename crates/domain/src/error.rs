/// Shared error type used across all Waypoint crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    /// The completion endpoint reported that the requested model does not
    /// exist. Distinct from [`Error::Provider`] so the invoker can apply
    /// its one-shot fallback policy.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The completion succeeded at the HTTP level but contained no text.
    #[error("completion response contained no text content")]
    EmptyCompletion,

    #[error("store: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
