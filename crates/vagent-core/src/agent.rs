//! Agent loop - the core tool-calling engine.
//!
//! Each run drives the model through at most `max_steps` steps:
//! - Send the conversation and the tool definitions to the model
//! - Collect the streamed text, reasoning and tool calls
//! - Execute the tool calls in order and feed their results back
//! - Stop when the model answers without calling a tool
//!
//! Steps are strictly sequential; each one depends on the previous tool
//! results.

use crate::error::{CoreError, CoreResult};
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vagent_provider::{
    ContentPart, GenerateOptions, LanguageModel, Message, ProviderError, StreamChunk,
    ToolDefinition, Usage,
};
use vagent_tools::{SharedFs, ToolContext, ToolRegistry};
use vagent_util::TimingGuard;

/// Step bound for batch runs.
pub const BATCH_MAX_STEPS: usize = 50;

/// Step bound for interactive runs.
pub const INTERACTIVE_MAX_STEPS: usize = 10;

/// Configuration for the agent loop.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System prompt.
    pub system: Option<String>,
    /// Maximum steps before stopping.
    pub max_steps: usize,
    /// Maximum tokens to generate per step.
    pub max_tokens: Option<u32>,
    /// Temperature for sampling.
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system: None,
            max_steps: BATCH_MAX_STEPS,
            max_tokens: Some(8192),
            temperature: None,
        }
    }
}

impl AgentConfig {
    /// Configuration for interactive sessions.
    pub fn interactive() -> Self {
        Self {
            max_steps: INTERACTIVE_MAX_STEPS,
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// One executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub result: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The model answered without requesting another tool.
    Completed,
    /// The step bound was exhausted first.
    StepLimitReached,
    /// The run was cancelled from outside.
    Cancelled,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::StepLimitReached => "step_limit_reached",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    /// Text of the last step that produced any.
    pub text: String,
    /// Number of model steps taken.
    pub step_count: usize,
    /// Every tool call, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Reasoning from every step, separated by blank lines.
    pub reasoning: Option<String>,
    /// Filesystem contents at the end of the run.
    pub files: BTreeMap<String, String>,
    pub outcome: RunOutcome,
    pub usage: Usage,
    /// The full conversation, for continuing in a later run.
    #[serde(skip)]
    pub messages: Vec<Message>,
}

/// Incremental progress of a streaming run.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    StepStarted {
        step: usize,
    },
    TextDelta(String),
    ReasoningDelta(String),
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    ToolResult {
        id: String,
        name: String,
        result: String,
    },
    Finished {
        outcome: RunOutcome,
        steps: usize,
    },
}

/// Optional event sink. A dropped receiver is not an error.
struct Emitter<'a>(Option<&'a UnboundedSender<AgentEvent>>);

impl Emitter<'_> {
    fn send(&self, event: AgentEvent) {
        if let Some(tx) = self.0 {
            let _ = tx.send(event);
        }
    }
}

/// A tool call as streamed by the model.
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

impl PendingCall {
    /// Decoded arguments; an empty argument string means no arguments.
    fn input(&self) -> Result<Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str(&self.arguments)
        }
    }
}

#[derive(Default)]
struct StepOutput {
    text: String,
    reasoning: String,
    tool_calls: Vec<PendingCall>,
    usage: Usage,
    cancelled: bool,
}

/// The agent loop executor.
///
/// # Example
///
/// ```ignore
/// let agent = AgentLoop::new(model, Arc::new(tools), fs, AgentConfig::default());
/// let result = agent.run("Summarise notes.md").await?;
/// println!("{} ({})", result.text, result.outcome);
/// ```
pub struct AgentLoop {
    model: Arc<dyn LanguageModel>,
    tools: Arc<ToolRegistry>,
    fs: SharedFs,
    config: AgentConfig,
    history: Vec<Message>,
    cancel: CancellationToken,
}

impl AgentLoop {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: Arc<ToolRegistry>,
        fs: SharedFs,
        config: AgentConfig,
    ) -> Self {
        Self {
            model,
            tools,
            fs,
            config,
            history: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Seed the conversation with earlier turns.
    pub fn with_history(mut self, messages: Vec<Message>) -> Self {
        self.history = messages;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run to completion and return the aggregated result.
    pub async fn run(&self, prompt: &str) -> CoreResult<AgentResult> {
        self.drive(prompt, Emitter(None)).await
    }

    /// Run, sending progress events as they happen.
    ///
    /// Within a step, a tool call is always sent before its result, and both
    /// before any text of the following step.
    pub async fn run_streaming(
        &self,
        prompt: &str,
        events: UnboundedSender<AgentEvent>,
    ) -> CoreResult<AgentResult> {
        self.drive(prompt, Emitter(Some(&events))).await
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .all()
            .map(|t| ToolDefinition {
                name: t.id().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }

    async fn drive(&self, prompt: &str, events: Emitter<'_>) -> CoreResult<AgentResult> {
        let mut messages = self.history.clone();
        messages.push(Message::user(prompt));

        let tool_defs = self.tool_definitions();
        let ctx = ToolContext::new(self.fs.clone()).with_abort(self.cancel.clone());

        let mut steps = 0;
        let mut text = String::new();
        let mut reasoning: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut usage = Usage::default();

        let outcome = loop {
            if self.cancel.is_cancelled() {
                break RunOutcome::Cancelled;
            }

            if steps >= self.config.max_steps {
                warn!(max_steps = self.config.max_steps, "Step limit reached");
                break RunOutcome::StepLimitReached;
            }

            steps += 1;
            debug!(step = steps, "Starting agent step");
            events.send(AgentEvent::StepStarted { step: steps });

            let step = self.step(messages.clone(), &tool_defs, &events).await?;
            usage.merge(&step.usage);
            if !step.text.is_empty() {
                text = step.text.clone();
            }
            if !step.reasoning.is_empty() {
                reasoning.push(step.reasoning.clone());
            }

            if step.cancelled {
                if !step.text.is_empty() {
                    messages.push(Message::assistant(step.text));
                }
                break RunOutcome::Cancelled;
            }

            let mut content = Vec::new();
            if !step.text.is_empty() {
                content.push(ContentPart::text(&step.text));
            }
            for call in &step.tool_calls {
                let input = call
                    .input()
                    .unwrap_or_else(|_| Value::String(call.arguments.clone()));
                content.push(ContentPart::tool_use(&call.id, &call.name, input));
            }
            if !content.is_empty() {
                messages.push(Message::assistant_parts(content));
            }

            if step.tool_calls.is_empty() {
                break RunOutcome::Completed;
            }

            for call in step.tool_calls {
                info!(tool = %call.name, step = steps, "Executing tool call");
                let (arguments, result) = match call.input() {
                    Ok(input) => {
                        events.send(AgentEvent::ToolCall {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            arguments: input.clone(),
                        });
                        let result = self.tools.invoke(&call.name, input.clone(), &ctx).await;
                        (input, result)
                    }
                    Err(e) => {
                        let raw = Value::String(call.arguments.clone());
                        events.send(AgentEvent::ToolCall {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            arguments: raw.clone(),
                        });
                        (raw, format!("Error: Invalid arguments: {e}"))
                    }
                };

                events.send(AgentEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    result: result.clone(),
                });
                messages.push(Message::tool_result(&call.id, &result));
                tool_calls.push(ToolCallRecord {
                    name: call.name,
                    arguments,
                    result,
                });
            }
        };

        info!(
            steps,
            outcome = %outcome,
            tool_calls = tool_calls.len(),
            "Agent run finished"
        );
        events.send(AgentEvent::Finished { outcome, steps });

        let files = ctx.fs().snapshot();
        Ok(AgentResult {
            text,
            step_count: steps,
            tool_calls,
            reasoning: (!reasoning.is_empty()).then(|| reasoning.join("\n\n")),
            files,
            outcome,
            usage,
            messages,
        })
    }

    /// One model round-trip.
    async fn step(
        &self,
        messages: Vec<Message>,
        tools: &[ToolDefinition],
        events: &Emitter<'_>,
    ) -> CoreResult<StepOutput> {
        let _timing = TimingGuard::model_step(&self.model.model_info().id);
        let mut out = StepOutput::default();

        let options = GenerateOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            system: self.config.system.clone(),
            tools: tools.to_vec(),
            abort: Some(self.cancel.clone()),
        };

        // Cancellation is checked before any ready model output.
        let mut stream = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                out.cancelled = true;
                return Ok(out);
            }
            result = self.model.generate(messages, options) => match result {
                Ok(stream) => stream,
                Err(ProviderError::Cancelled) => {
                    out.cancelled = true;
                    return Ok(out);
                }
                Err(e) => {
                    error!(error = %e, "Model request failed");
                    return Err(CoreError::Provider(e));
                }
            },
        };

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    out.cancelled = true;
                    break;
                }
                chunk = stream.next() => chunk,
            };
            let chunk = match chunk {
                None => break,
                Some(Ok(chunk)) => chunk,
                Some(Err(ProviderError::Cancelled)) => {
                    out.cancelled = true;
                    break;
                }
                Some(Err(e)) => {
                    error!(error = %e, "Model stream failed");
                    return Err(CoreError::Provider(e));
                }
            };

            match chunk {
                StreamChunk::TextDelta(delta) => {
                    out.text.push_str(&delta);
                    events.send(AgentEvent::TextDelta(delta));
                }
                StreamChunk::ReasoningDelta(delta) => {
                    out.reasoning.push_str(&delta);
                    events.send(AgentEvent::ReasoningDelta(delta));
                }
                StreamChunk::ToolCallStart { id, name } => {
                    debug!(id = %id, name = %name, "Tool call started");
                    out.tool_calls.push(PendingCall {
                        id,
                        name,
                        arguments: String::new(),
                    });
                }
                StreamChunk::ToolCallDelta { id, delta } => {
                    if let Some(call) = out.tool_calls.iter_mut().find(|c| c.id == id) {
                        call.arguments.push_str(&delta);
                    }
                }
                StreamChunk::ToolCall {
                    id,
                    name,
                    arguments,
                } => {
                    if let Some(call) = out.tool_calls.iter_mut().find(|c| c.id == id) {
                        call.arguments = arguments;
                    } else {
                        out.tool_calls.push(PendingCall {
                            id,
                            name,
                            arguments,
                        });
                    }
                }
                StreamChunk::FinishStep {
                    usage,
                    finish_reason,
                } => {
                    debug!(
                        input = usage.input_tokens,
                        output = usage.output_tokens,
                        reason = ?finish_reason,
                        "Step finished"
                    );
                    out.usage = usage;
                }
                StreamChunk::Error(message) => {
                    error!(error = %message, "Model reported an error");
                    return Err(CoreError::Provider(ProviderError::internal(message)));
                }
                StreamChunk::TextStart
                | StreamChunk::TextEnd
                | StreamChunk::ReasoningStart
                | StreamChunk::ReasoningEnd => {}
            }
        }

        Ok(out)
    }
}
