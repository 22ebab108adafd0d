//! Scripted provider implementation.
//!
//! Replays a queue of model steps and records every request it receives.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vagent_provider::{
    ContentPart, FinishReason, GenerateOptions, LanguageModel, Message, ModelInfo, ProviderError,
    ProviderResult, StreamChunk, Usage,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A language model that replays scripted steps.
///
/// Each call to `generate` consumes the next queued step; once the queue is
/// empty the default step is returned on every call.
///
/// # Example
///
/// ```rust,ignore
/// use vagent_test_utils::providers::ScriptedProvider;
///
/// let provider = ScriptedProvider::new()
///     .with_tool_call("call_1", "run_shell", r#"{"command":"ls"}"#)
///     .with_response("The directory is empty.");
///
/// // Use provider in test...
///
/// let calls = provider.calls();
/// assert_eq!(calls.len(), 2);
/// ```
pub struct ScriptedProvider {
    model: ModelInfo,
    /// Recorded calls to generate().
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Queue of steps to return.
    steps: Arc<Mutex<VecDeque<ScriptedStep>>>,
    /// Step returned when the queue is empty.
    default_step: Arc<Mutex<ScriptedStep>>,
}

/// A recorded call to the provider.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The messages sent to the provider.
    pub messages: Vec<Message>,
    /// The options used for generation.
    pub options: GenerateOptions,
}

impl RecordedCall {
    /// Names of the tools offered in this call.
    pub fn tool_names(&self) -> Vec<&str> {
        self.options.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// One scripted model step.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Return a text response.
    Text(String),
    /// Return a text response with thinking/reasoning.
    TextWithThinking { thinking: String, text: String },
    /// Return a tool call.
    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },
    /// Return multiple tool calls in one step.
    MultipleToolCalls(Vec<(String, String, String)>), // (id, name, arguments)
    /// Fail the request.
    Error(String),
    /// Return a sequence of chunks verbatim.
    Chunks(Vec<StreamChunk>),
    /// Return a stream that never produces anything.
    Hang,
    /// Wait for the request's abort token, then fail with `Cancelled`.
    UntilAborted,
    /// Fail the stream with `Cancelled` straight away.
    Cancelled,
}

impl Default for ScriptedStep {
    fn default() -> Self {
        ScriptedStep::Text("Test response".to_string())
    }
}

impl ScriptedStep {
    /// A tool call step.
    pub fn tool_call(id: &str, name: &str, arguments: &str) -> Self {
        Self::ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

impl ScriptedProvider {
    /// Create a new scripted provider.
    pub fn new() -> Self {
        Self {
            model: ModelInfo::new("scripted-model", "scripted"),
            calls: Arc::new(Mutex::new(Vec::new())),
            steps: Arc::new(Mutex::new(VecDeque::new())),
            default_step: Arc::new(Mutex::new(ScriptedStep::default())),
        }
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: ModelInfo) -> Self {
        self.model = model;
        self
    }

    /// Queue a step.
    pub fn with_step(self, step: ScriptedStep) -> Self {
        lock(&self.steps).push_back(step);
        self
    }

    /// Queue a text response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_step(ScriptedStep::Text(text.into()))
    }

    /// Queue a response with thinking.
    pub fn with_thinking_response(
        self,
        thinking: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.with_step(ScriptedStep::TextWithThinking {
            thinking: thinking.into(),
            text: text.into(),
        })
    }

    /// Queue a tool call response.
    pub fn with_tool_call(self, id: &str, name: &str, arguments: &str) -> Self {
        self.with_step(ScriptedStep::tool_call(id, name, arguments))
    }

    /// Queue an error response.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.with_step(ScriptedStep::Error(message.into()))
    }

    /// Set the step returned when the queue is empty.
    pub fn with_default_step(self, step: ScriptedStep) -> Self {
        *lock(&self.default_step) = step;
        self
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Get the last call made.
    pub fn last_call(&self) -> Option<RecordedCall> {
        lock(&self.calls).last().cloned()
    }

    /// Number of queued steps not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.steps).len()
    }

    /// Check if a message containing the given text was sent.
    pub fn was_sent(&self, text: &str) -> bool {
        lock(&self.calls).iter().any(|call| {
            call.messages.iter().any(|msg| {
                msg.content.iter().any(|part| match part {
                    ContentPart::Text { text: t } => t.contains(text),
                    ContentPart::ToolResult { content, .. } => content.contains(text),
                    _ => false,
                })
            })
        })
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for ScriptedProvider {
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> ProviderResult<BoxStream<'static, ProviderResult<StreamChunk>>> {
        let abort = options.abort.clone();
        lock(&self.calls).push(RecordedCall { messages, options });

        let step = lock(&self.steps)
            .pop_front()
            .unwrap_or_else(|| lock(&self.default_step).clone());

        if let ScriptedStep::Hang = step {
            return Ok(Box::pin(stream::pending()));
        }
        if let (ScriptedStep::UntilAborted, None) = (&step, &abort) {
            return Ok(Box::pin(stream::pending()));
        }

        Ok(Box::pin(try_stream! {
            match step {
                ScriptedStep::Text(text) => {
                    yield StreamChunk::TextStart;
                    yield StreamChunk::TextDelta(text);
                    yield StreamChunk::TextEnd;
                    yield StreamChunk::FinishStep {
                        usage: Usage::new(100, 50),
                        finish_reason: FinishReason::EndTurn,
                    };
                }
                ScriptedStep::TextWithThinking { thinking, text } => {
                    yield StreamChunk::ReasoningStart;
                    yield StreamChunk::ReasoningDelta(thinking);
                    yield StreamChunk::ReasoningEnd;
                    yield StreamChunk::TextStart;
                    yield StreamChunk::TextDelta(text);
                    yield StreamChunk::TextEnd;
                    yield StreamChunk::FinishStep {
                        usage: Usage {
                            input_tokens: 100,
                            output_tokens: 50,
                            reasoning_tokens: 30,
                        },
                        finish_reason: FinishReason::EndTurn,
                    };
                }
                ScriptedStep::ToolCall { id, name, arguments } => {
                    yield StreamChunk::ToolCallStart { id: id.clone(), name: name.clone() };
                    yield StreamChunk::ToolCall { id, name, arguments };
                    yield StreamChunk::FinishStep {
                        usage: Usage::new(100, 50),
                        finish_reason: FinishReason::ToolUse,
                    };
                }
                ScriptedStep::MultipleToolCalls(calls) => {
                    for (id, name, arguments) in calls {
                        yield StreamChunk::ToolCallStart { id: id.clone(), name: name.clone() };
                        yield StreamChunk::ToolCall { id, name, arguments };
                    }
                    yield StreamChunk::FinishStep {
                        usage: Usage::new(100, 50),
                        finish_reason: FinishReason::ToolUse,
                    };
                }
                ScriptedStep::Chunks(chunks) => {
                    for chunk in chunks {
                        yield chunk;
                    }
                }
                ScriptedStep::Error(message) => {
                    Err(ProviderError::internal(message))?;
                }
                ScriptedStep::UntilAborted => {
                    if let Some(abort) = abort {
                        abort.cancelled().await;
                    }
                    Err(ProviderError::Cancelled)?;
                }
                ScriptedStep::Cancelled => {
                    Err(ProviderError::Cancelled)?;
                }
                ScriptedStep::Hang => {}
            }
        }))
    }

    fn model_info(&self) -> &ModelInfo {
        &self.model
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}
