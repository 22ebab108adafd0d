//! Tool error types.

use thiserror::Error;
use vagent_vfs::VfsError;

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool execution.
///
/// None of these reach the model as a structured error: the registry renders
/// them as `Error: ...` text.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters.
    #[error("{0}")]
    Validation(String),

    /// The model asked for a tool that is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Filesystem or shell failure.
    #[error("{0}")]
    Vfs(#[from] VfsError),

    /// Research backend failure.
    #[error("{0}")]
    Research(#[from] ResearchError),

    /// Operation was cancelled.
    #[error("Cancelled")]
    Cancelled,

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Render as the text the model sees.
    pub fn to_tool_text(&self) -> String {
        format!("Error: {self}")
    }
}

/// Result type for research backend operations.
pub type ResearchResult<T> = Result<T, ResearchError>;

/// Errors raised by a research backend.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// The document server answered with a non-success status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A date filter is not `YYYY-MM-DD`.
    #[error("Invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    /// The catalog file could not be read.
    #[error("Catalog unreadable: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON.
    #[error("Catalog malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResearchError {
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_text() {
        assert_eq!(
            ToolError::unknown_tool("python").to_tool_text(),
            "Error: Unknown tool: python"
        );
        let vfs = ToolError::from(VfsError::NotFound("/home/user/x".into()));
        assert_eq!(vfs.to_tool_text(), "Error: File /home/user/x does not exist.");
    }

    #[test]
    fn test_research_messages() {
        assert_eq!(ResearchError::Http { status: 404 }.to_string(), "HTTP 404");
        assert_eq!(
            ResearchError::invalid_date("yesterday").to_string(),
            "Invalid date 'yesterday' (expected YYYY-MM-DD)"
        );
    }
}
