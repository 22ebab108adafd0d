//! Language model provider abstraction for vagent.
//!
//! This crate provides a unified streaming interface over language models:
//! - Conversation messages and streamed response chunks
//! - A catalogue of supported models with their thinking-effort mapping
//! - An OpenRouter provider that reaches every catalogued model

pub mod catalog;
pub mod error;
pub mod message;
pub mod model;
pub mod openrouter;
pub mod stream;

pub use catalog::{
    create_model, ModelConfig, ModelKey, ProviderFamily, ReasoningParam, ThinkingEffort,
};
pub use error::{ProviderError, ProviderResult};
pub use message::{ContentPart, Message, Role};
pub use model::{ModelCapabilities, ModelInfo, ModelLimit};
pub use stream::{FinishReason, StreamChunk, Usage};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::sync::Arc;

/// Options for text generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0-1.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// System prompt.
    pub system: Option<String>,
    /// Available tools.
    pub tools: Vec<ToolDefinition>,
    /// Cancellation token.
    pub abort: Option<tokio_util::sync::CancellationToken>,
}

/// A tool definition for the model.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for the tool parameters.
    pub parameters: Value,
}

/// The main trait for language models.
///
/// One call to `generate` is one model step: the returned stream carries the
/// step's text, reasoning and tool calls, and ends with a `FinishStep`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a streaming response.
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> ProviderResult<BoxStream<'static, ProviderResult<StreamChunk>>>;

    /// Get information about this model.
    fn model_info(&self) -> &ModelInfo;

    /// Get the provider ID (e.g., "openrouter").
    fn provider_id(&self) -> &str;
}

/// A boxed language model for dynamic dispatch.
pub type BoxedLanguageModel = Arc<dyn LanguageModel>;
