//! Muninn error types

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("feed parse error: {0}")]
    Feed(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No providers registered for the requested resource. The chains built
    /// by [`MuninnBuilder`](crate::MuninnBuilder) always end in a static
    /// fallback, so this only occurs with a hand-assembled registry.
    #[error("no provider configured")]
    NoProvider,

    /// Every provider in the chain returned `Empty` or `Failure`. The static
    /// fallback is defined to always succeed, so reaching this is a
    /// configuration bug, not an expected runtime condition.
    #[error("provider chain exhausted without a result")]
    Exhausted,
}

impl From<reqwest::Error> for MuninnError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => MuninnError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => MuninnError::Http(err.to_string()),
        }
    }
}

/// Result type alias for Muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
