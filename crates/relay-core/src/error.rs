//! Error types for calls made against the chat platform.

use thiserror::Error;

/// Error type for platform API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot is not connected.
    #[error("bot is not connected")]
    NotConnected,

    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,

    /// The platform rejected the request.
    #[error("request rejected ({code}): {message}")]
    Rejected {
        /// Platform error code.
        code: i64,
        /// Platform error message.
        message: String,
    },

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a rejection error.
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
