//! Filesystem error types.
//!
//! These never reach the model as structured values: the shell and the tool
//! layer render them as text prefixed with `Error:`.

use thiserror::Error;

/// Result type for filesystem operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Errors that can occur during filesystem and shell operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// No file at the resolved path.
    #[error("File {0} does not exist.")]
    NotFound(String),

    /// A command was invoked without a required operand.
    #[error("{command} requires {what}")]
    MissingOperand {
        command: &'static str,
        what: &'static str,
    },

    /// A flag value could not be parsed.
    #[error("Invalid value for {flag}: '{value}' (expected a non-negative integer)")]
    InvalidFlagValue { flag: String, value: String },

    /// Wrong number of arguments.
    #[error("{0}")]
    Usage(String),

    /// The grep pattern is not a valid regular expression.
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The verb is not part of the sandbox shell.
    #[error("Command '{0}' not implemented in virtual sandbox.")]
    NotImplemented(String),

    /// Host IO error during disk import/export.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VfsError {
    /// Create a missing operand error.
    pub fn missing(command: &'static str, what: &'static str) -> Self {
        Self::MissingOperand { command, what }
    }

    /// Create an invalid flag value error.
    pub fn invalid_flag(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFlagValue {
            flag: flag.into(),
            value: value.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Render the error the way the model sees it.
    pub fn to_tool_text(&self) -> String {
        format!("Error: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_path() {
        let err = VfsError::NotFound("/home/user/a.txt".to_string());
        assert_eq!(
            err.to_tool_text(),
            "Error: File /home/user/a.txt does not exist."
        );
    }

    #[test]
    fn missing_operand_formats_message() {
        let err = VfsError::missing("grep", "a pattern");
        assert_eq!(err.to_string(), "grep requires a pattern");
    }

    #[test]
    fn invalid_flag_names_the_flag() {
        let err = VfsError::invalid_flag("-A", "three");
        assert!(err.to_string().contains("-A"));
        assert!(err.to_string().contains("three"));
    }

    #[test]
    fn not_implemented_formats_verb() {
        let err = VfsError::NotImplemented("wget".to_string());
        assert_eq!(
            err.to_tool_text(),
            "Error: Command 'wget' not implemented in virtual sandbox."
        );
    }
}
