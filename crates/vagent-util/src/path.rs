//! Well-known host directories.

use std::path::PathBuf;

/// Get the vagent configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/vagent` if set
/// - `~/.config/vagent` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vagent"))
}

/// Path of the persisted settings file.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

/// Get the vagent logs directory.
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|p| p.join("logs"))
}

/// Host directory mirrored into the sandbox when none is configured.
pub fn default_workspace_dir() -> PathBuf {
    PathBuf::from("workspace")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_inside_config_dir() {
        if let (Some(config), Some(settings)) = (config_dir(), settings_path()) {
            assert!(settings.starts_with(&config));
            assert!(settings.ends_with("settings.json"));
        }
    }

    #[test]
    fn test_logs_inside_config_dir() {
        if let (Some(config), Some(logs)) = (config_dir(), logs_dir()) {
            assert_eq!(logs, config.join("logs"));
        }
    }

    #[test]
    fn test_default_workspace_is_relative() {
        assert!(default_workspace_dir().is_relative());
    }
}
