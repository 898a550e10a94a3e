//! Error types for auth operations.

/// Error type for auth operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote API rejected or failed a call.
    #[error("API error: {0}")]
    Client(#[from] fortuna_client::Error),

    /// A profile load through the caching layer failed.
    #[error("profile load failed: {0}")]
    Profile(#[from] fortuna_cache::Error),
}

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
