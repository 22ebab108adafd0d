//! Provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Unknown model key.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Unknown thinking effort level.
    #[error("Unknown thinking effort: {0} (expected off, low, medium or high)")]
    UnknownEffort(String),

    /// Missing API key.
    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),

    /// Invalid API key.
    #[error("Invalid API key for provider: {0}")]
    InvalidApiKey(String),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        retry_after: Option<std::time::Duration>,
    },

    /// Stream interrupted.
    #[error("Stream interrupted")]
    StreamInterrupted,

    /// Operation cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error (for streaming).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal provider error.
    #[error("Provider error: {message}")]
    Internal { message: String },

    /// API error with status code.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
}

impl ProviderError {
    /// Create an unknown model error.
    pub fn unknown_model(key: impl Into<String>) -> Self {
        Self::UnknownModel(key.into())
    }

    /// Create a missing API key error.
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey(provider.into())
    }

    /// Create an invalid API key error.
    pub fn invalid_api_key(provider: impl Into<String>) -> Self {
        Self::InvalidApiKey(provider.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an API error.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ProviderError::missing_api_key("openrouter").to_string(),
            "Missing API key for provider: openrouter"
        );
        assert_eq!(
            ProviderError::api_error(500, "boom").to_string(),
            "API error (500): boom"
        );
    }
}
