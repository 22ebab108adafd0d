//! Error types for the core crate.

use thiserror::Error;
use vagent_provider::ProviderError;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The model call failed; the run produced no result.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// No such setting.
    #[error("unknown setting: {key} (expected one of: {})", crate::config::Settings::KEYS.join(", "))]
    UnknownKey { key: String },

    /// A setting value could not be parsed.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Invalid path (e.g., could not determine config directory).
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
