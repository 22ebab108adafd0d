//! Persistent settings for vagent.
//!
//! Settings live in `~/.config/vagent/settings.json`. A missing file yields
//! the defaults; a malformed one is an error rather than silently ignored.
//! Environment overrides are applied on top:
//! - `VAGENT_MODEL` - model key
//! - `VAGENT_THINKING` - thinking effort
//! - `VAGENT_WORKSPACE` - host workspace directory
//! - `VAGENT_CATALOG` - research catalog path

use crate::agent::{BATCH_MAX_STEPS, INTERACTIVE_MAX_STEPS};
use crate::error::{ConfigError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vagent_provider::{ModelConfig, ModelKey, ProviderError, ThinkingEffort};

/// Environment variable holding the OpenRouter API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model to drive.
    pub model: ModelKey,

    /// Thinking effort for reasoning-capable models.
    pub thinking: ThinkingEffort,

    /// Step bound for `run`.
    pub max_steps: usize,

    /// Step bound for `chat`.
    pub interactive_max_steps: usize,

    /// Host directory mirrored into the sandbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    /// Research catalog file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Base URL for full paper documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub papers_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelKey::default(),
            thinking: ThinkingEffort::default(),
            max_steps: BATCH_MAX_STEPS,
            interactive_max_steps: INTERACTIVE_MAX_STEPS,
            workspace: None,
            catalog: None,
            papers_url: None,
        }
    }
}

impl Settings {
    /// Every settable key.
    pub const KEYS: [&'static str; 7] = [
        "model",
        "thinking",
        "max_steps",
        "interactive_max_steps",
        "workspace",
        "catalog",
        "papers_url",
    ];

    /// Default settings file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        vagent_util::path::settings_path().ok_or_else(|| {
            ConfigError::InvalidPath("Could not determine config directory".to_string())
        })
    }

    /// Load settings from the default location.
    pub async fn load() -> CoreResult<Self> {
        Self::load_from(&Self::default_path()?).await
    }

    /// Load settings from a file. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> CoreResult<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let settings = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(settings)
    }

    /// Save settings to the default location.
    pub async fn save(&self) -> CoreResult<()> {
        self.save_to(&Self::default_path()?).await
    }

    /// Save settings to a file, creating its directory.
    pub async fn save_to(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Current value of a setting, `None` when an optional one is unset.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "model" => Some(self.model.to_string()),
            "thinking" => Some(self.thinking.to_string()),
            "max_steps" => Some(self.max_steps.to_string()),
            "interactive_max_steps" => Some(self.interactive_max_steps.to_string()),
            "workspace" => self.workspace.as_ref().map(|p| p.display().to_string()),
            "catalog" => self.catalog.as_ref().map(|p| p.display().to_string()),
            "papers_url" => self.papers_url.clone(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Update a setting from its string form.
    ///
    /// An empty value or `none` clears an optional setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "model" => {
                self.model = value
                    .parse()
                    .map_err(|e: ProviderError| ConfigError::invalid_value(key, e.to_string()))?;
            }
            "thinking" => {
                self.thinking = value
                    .parse()
                    .map_err(|e: ProviderError| ConfigError::invalid_value(key, e.to_string()))?;
            }
            "max_steps" => self.max_steps = parse_steps(key, value)?,
            "interactive_max_steps" => self.interactive_max_steps = parse_steps(key, value)?,
            "workspace" => self.workspace = optional(value).map(PathBuf::from),
            "catalog" => self.catalog = optional(value).map(PathBuf::from),
            "papers_url" => self.papers_url = optional(value).map(str::to_string),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Apply `VAGENT_*` environment overrides.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup. Invalid values are logged
    /// and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        const OVERRIDES: [(&str, &str); 4] = [
            ("VAGENT_MODEL", "model"),
            ("VAGENT_THINKING", "thinking"),
            ("VAGENT_WORKSPACE", "workspace"),
            ("VAGENT_CATALOG", "catalog"),
        ];

        for (var, key) in OVERRIDES {
            if let Some(value) = lookup(var) {
                if let Err(e) = self.set(key, &value) {
                    warn!(var, error = %e, "Ignoring invalid environment override");
                }
            }
        }
        self
    }

    /// Model selection for the current settings.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::select(self.model, self.thinking)
    }

    /// Host workspace directory, falling back to `./workspace`.
    pub fn workspace_dir(&self) -> PathBuf {
        self.workspace
            .clone()
            .unwrap_or_else(vagent_util::path::default_workspace_dir)
    }
}

/// Read the OpenRouter API key from the environment.
pub fn openrouter_api_key() -> Result<String, ProviderError> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ProviderError::missing_api_key("openrouter"))
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
    }
}

fn optional(value: &str) -> Option<&str> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value)
    }
}

fn parse_steps(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err(ConfigError::invalid_value(key, "must be at least 1")),
        Err(e) => Err(ConfigError::invalid_value(key, e.to_string())),
    }
}
