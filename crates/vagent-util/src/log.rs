//! Logging setup using tracing.
//!
//! Agent output goes to stdout, so by default logs are written to a file
//! under the config directory. `print` switches them to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a log level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Filter directive covering every vagent crate at this level.
    pub fn directive(&self) -> String {
        let level = self.as_str();
        [
            "vagent",
            "vagent_core",
            "vagent_tools",
            "vagent_vfs",
            "vagent_provider",
            "vagent_util",
        ]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LogConfig {
    /// Whether to print logs to stderr instead of the log file.
    pub print: bool,
    /// Log level.
    pub level: LogLevel,
    /// Whether to include file/line info in logs.
    pub include_location: bool,
    /// Log file path (if any).
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            print: false,
            level: LogLevel::Info,
            include_location: false,
            file: default_log_path(),
        }
    }
}

/// Initialize logging with the given configuration.
///
/// This should be called once at application startup. Returns the log file
/// path when logging to a file.
pub fn init(config: LogConfig) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.print {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        subscriber.with(fmt_layer).init();
        return None;
    }

    let Some(log_file) = config.file else {
        // No destination: keep the registry so spans still work.
        subscriber.init();
        return None;
    };

    if let Some(parent) = log_file.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {}", e);
            subscriber.init();
            return None;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            subscriber.init();
            return None;
        }
    };

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    subscriber.with(fmt_layer).init();
    Some(log_file)
}

/// Get the default log file path.
pub fn default_log_path() -> Option<PathBuf> {
    crate::path::logs_dir().map(|p| p.join("vagent.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_directive_covers_workspace_crates() {
        let directive = LogLevel::Debug.directive();
        assert!(directive.starts_with("vagent=debug"));
        assert!(directive.contains("vagent_core=debug"));
        assert!(directive.contains("vagent_vfs=debug"));
    }

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert!(!config.print);
        assert_eq!(config.level, LogLevel::Info);
    }
}
