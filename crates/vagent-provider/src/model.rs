//! Model information types.

use serde::{Deserialize, Serialize};

/// Information about a model.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelInfo {
    /// Model ID as the provider expects it (e.g., "anthropic/claude-sonnet-4.5").
    pub id: String,
    /// Provider ID (e.g., "anthropic").
    pub provider_id: String,
    /// Human-readable name.
    pub name: String,
    /// Model family (e.g., "claude-4.5").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Model capabilities.
    pub capabilities: ModelCapabilities,
    /// Token limits.
    pub limit: ModelLimit,
}

/// Model capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    /// Supports temperature parameter.
    #[serde(default)]
    pub temperature: bool,
    /// Supports reasoning/thinking mode.
    #[serde(default)]
    pub reasoning: bool,
    /// Supports tool/function calling.
    #[serde(default = "default_true")]
    pub tool_call: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            temperature: true,
            reasoning: false,
            tool_call: true,
        }
    }
}

impl ModelCapabilities {
    /// Capabilities of a tool-calling reasoning model.
    pub fn reasoning() -> Self {
        Self {
            reasoning: true,
            ..Default::default()
        }
    }
}

/// Model token limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelLimit {
    /// Maximum context length (input + output).
    pub context: u32,
    /// Maximum output tokens.
    pub output: u32,
}

impl ModelInfo {
    /// Create a new model info with defaults.
    pub fn new(id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider_id: provider_id.into(),
            ..Default::default()
        }
    }

    /// Set the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the model family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Set the model capabilities.
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the model limits.
    pub fn with_limit(mut self, context: u32, output: u32) -> Self {
        self.limit = ModelLimit { context, output };
        self
    }
}

/// Built-in model definitions for Anthropic.
pub mod anthropic {
    use super::*;

    /// Claude Sonnet 4.5 - Smart model for complex agents.
    pub fn claude_sonnet_4_5() -> ModelInfo {
        ModelInfo::new("anthropic/claude-sonnet-4.5", "anthropic")
            .with_name("Claude Sonnet 4.5")
            .with_family("claude-4.5")
            .with_capabilities(ModelCapabilities::reasoning())
            .with_limit(200_000, 64_000)
    }

    /// Claude Haiku 4.5 - Fastest model with near-frontier intelligence.
    pub fn claude_haiku_4_5() -> ModelInfo {
        ModelInfo::new("anthropic/claude-haiku-4.5", "anthropic")
            .with_name("Claude Haiku 4.5")
            .with_family("claude-4.5")
            .with_capabilities(ModelCapabilities::reasoning())
            .with_limit(200_000, 64_000)
    }
}

/// Built-in model definitions for OpenAI.
pub mod openai {
    use super::*;

    /// GPT-4.1.
    pub fn gpt_4_1() -> ModelInfo {
        ModelInfo::new("openai/gpt-4.1", "openai")
            .with_name("GPT-4.1")
            .with_family("gpt-4.1")
            .with_limit(1_047_576, 32_768)
    }

    /// GPT-4.1 mini.
    pub fn gpt_4_1_mini() -> ModelInfo {
        ModelInfo::new("openai/gpt-4.1-mini", "openai")
            .with_name("GPT-4.1 mini")
            .with_family("gpt-4.1")
            .with_limit(1_047_576, 32_768)
    }

    /// o4-mini. Reasoning model without temperature control.
    pub fn o4_mini() -> ModelInfo {
        ModelInfo::new("openai/o4-mini", "openai")
            .with_name("o4-mini")
            .with_family("o4")
            .with_capabilities(ModelCapabilities {
                temperature: false,
                reasoning: true,
                tool_call: true,
            })
            .with_limit(200_000, 100_000)
    }
}

/// Built-in model definitions for Google.
pub mod google {
    use super::*;

    /// Gemini 2.5 Pro.
    pub fn gemini_2_5_pro() -> ModelInfo {
        ModelInfo::new("google/gemini-2.5-pro", "google")
            .with_name("Gemini 2.5 Pro")
            .with_family("gemini-2.5")
            .with_capabilities(ModelCapabilities::reasoning())
            .with_limit(1_048_576, 65_536)
    }

    /// Gemini 2.5 Flash.
    pub fn gemini_2_5_flash() -> ModelInfo {
        ModelInfo::new("google/gemini-2.5-flash", "google")
            .with_name("Gemini 2.5 Flash")
            .with_family("gemini-2.5")
            .with_capabilities(ModelCapabilities::reasoning())
            .with_limit(1_048_576, 65_536)
    }
}
