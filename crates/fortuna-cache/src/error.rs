//! Error types for cache and fetch operations.

/// Error type for cache and fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream returned a non-success HTTP status.
    #[error("upstream status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Transport-level failure before a status was received.
    #[error("network error: {0}")]
    Network(String),

    /// Payload serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cache and fetch operations.
pub type Result<T> = std::result::Result<T, Error>;
