//! Supported models and thinking-effort mapping.
//!
//! Each provider family spells "think harder" differently: Anthropic and
//! Google take a token budget, OpenAI takes an effort level. The mapping is
//! one static table so call sites never branch on the family.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ProviderError, ProviderResult};
use crate::model::{self, ModelInfo};
use crate::openrouter::OpenRouterProvider;
use crate::BoxedLanguageModel;

/// The models vagent knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKey {
    #[default]
    #[serde(rename = "claude-sonnet-4.5")]
    ClaudeSonnet45,
    #[serde(rename = "claude-haiku-4.5")]
    ClaudeHaiku45,
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,
    #[serde(rename = "o4-mini")]
    O4Mini,
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
}

/// Provider families with distinct reasoning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    Anthropic,
    OpenAI,
    Google,
}

impl ModelKey {
    /// Every supported model, in display order.
    pub const ALL: [ModelKey; 7] = [
        ModelKey::ClaudeSonnet45,
        ModelKey::ClaudeHaiku45,
        ModelKey::Gpt41,
        ModelKey::Gpt41Mini,
        ModelKey::O4Mini,
        ModelKey::Gemini25Pro,
        ModelKey::Gemini25Flash,
    ];

    /// The key as users type it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaudeSonnet45 => "claude-sonnet-4.5",
            Self::ClaudeHaiku45 => "claude-haiku-4.5",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::O4Mini => "o4-mini",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            Self::ClaudeSonnet45 | Self::ClaudeHaiku45 => ProviderFamily::Anthropic,
            Self::Gpt41 | Self::Gpt41Mini | Self::O4Mini => ProviderFamily::OpenAI,
            Self::Gemini25Pro | Self::Gemini25Flash => ProviderFamily::Google,
        }
    }

    /// Model metadata.
    pub fn info(&self) -> ModelInfo {
        match self {
            Self::ClaudeSonnet45 => model::anthropic::claude_sonnet_4_5(),
            Self::ClaudeHaiku45 => model::anthropic::claude_haiku_4_5(),
            Self::Gpt41 => model::openai::gpt_4_1(),
            Self::Gpt41Mini => model::openai::gpt_4_1_mini(),
            Self::O4Mini => model::openai::o4_mini(),
            Self::Gemini25Pro => model::google::gemini_2_5_pro(),
            Self::Gemini25Flash => model::google::gemini_2_5_flash(),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKey {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProviderError::unknown_model(s))
    }
}

/// How much the model should deliberate before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingEffort {
    #[default]
    Off,
    Low,
    Medium,
    High,
}

impl ThinkingEffort {
    pub const ALL: [ThinkingEffort; 4] = [Self::Off, Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ThinkingEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinkingEffort {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ProviderError::UnknownEffort(other.to_string())),
        }
    }
}

/// Provider-specific reasoning parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningParam {
    #[default]
    None,
    /// Maximum thinking tokens.
    BudgetTokens(u32),
    /// Named effort level.
    Effort(&'static str),
}

impl ReasoningParam {
    /// The OpenRouter `reasoning` request object, if any.
    pub fn to_request(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::BudgetTokens(n) => Some(json!({ "max_tokens": n })),
            Self::Effort(level) => Some(json!({ "effort": level })),
        }
    }
}

const REASONING_TABLE: &[(ProviderFamily, ThinkingEffort, ReasoningParam)] = &[
    (ProviderFamily::Anthropic, ThinkingEffort::Low, ReasoningParam::BudgetTokens(1024)),
    (ProviderFamily::Anthropic, ThinkingEffort::Medium, ReasoningParam::BudgetTokens(4096)),
    (ProviderFamily::Anthropic, ThinkingEffort::High, ReasoningParam::BudgetTokens(16_000)),
    (ProviderFamily::OpenAI, ThinkingEffort::Low, ReasoningParam::Effort("low")),
    (ProviderFamily::OpenAI, ThinkingEffort::Medium, ReasoningParam::Effort("medium")),
    (ProviderFamily::OpenAI, ThinkingEffort::High, ReasoningParam::Effort("high")),
    (ProviderFamily::Google, ThinkingEffort::Low, ReasoningParam::BudgetTokens(1024)),
    (ProviderFamily::Google, ThinkingEffort::Medium, ReasoningParam::BudgetTokens(8192)),
    (ProviderFamily::Google, ThinkingEffort::High, ReasoningParam::BudgetTokens(24_576)),
];

fn reasoning_for(family: ProviderFamily, effort: ThinkingEffort) -> ReasoningParam {
    REASONING_TABLE
        .iter()
        .find(|(f, e, _)| *f == family && *e == effort)
        .map(|(_, _, param)| *param)
        .unwrap_or_default()
}

/// A concrete model selection: metadata plus the reasoning parameter to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub key: ModelKey,
    pub effort: ThinkingEffort,
    pub info: ModelInfo,
    pub reasoning: ReasoningParam,
}

impl ModelConfig {
    /// Resolve a model key and effort level into a configuration.
    ///
    /// Models without reasoning support always get [`ReasoningParam::None`].
    pub fn select(key: ModelKey, effort: ThinkingEffort) -> Self {
        let info = key.info();
        let reasoning = if info.capabilities.reasoning {
            reasoning_for(key.family(), effort)
        } else {
            ReasoningParam::None
        };
        Self {
            key,
            effort,
            info,
            reasoning,
        }
    }
}

/// Build a provider for a model configuration.
pub fn create_model(config: &ModelConfig, api_key: &str) -> ProviderResult<BoxedLanguageModel> {
    if api_key.trim().is_empty() {
        return Err(ProviderError::missing_api_key("openrouter"));
    }
    let provider = OpenRouterProvider::new(api_key, config.info.clone())?
        .with_reasoning(config.reasoning);
    Ok(Arc::new(provider))
}
