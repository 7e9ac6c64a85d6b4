//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by document store clients.
///
/// HTTP error statuses are not errors at this level: they are returned as
/// responses and interpreted by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response
    #[error("Store request failed: {0}")]
    Transport(String),

    /// The response body was not JSON
    #[error("Failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client configuration is unusable
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
