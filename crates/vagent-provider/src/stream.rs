//! Incremental model output.
//!
//! A model step arrives as a sequence of [`StreamChunk`]s. Text and reasoning
//! are bracketed by start/end markers; tool calls may arrive whole or as a
//! start followed by argument fragments. Every well-formed step ends with a
//! single `FinishStep`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    TextStart,
    /// A fragment of the visible answer.
    TextDelta(String),
    TextEnd,

    ReasoningStart,
    /// A fragment of the model's reasoning trace. Only reasoning models send these.
    ReasoningDelta(String),
    ReasoningEnd,

    /// The model began a tool call; arguments follow as `ToolCallDelta`s.
    ToolCallStart { id: String, name: String },
    /// Raw JSON text to append to the arguments of call `id`.
    ToolCallDelta { id: String, delta: String },
    /// A tool call with its complete argument JSON. Replaces any fragments
    /// collected for the same `id`.
    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },

    FinishStep {
        usage: Usage,
        finish_reason: FinishReason,
    },

    /// The provider reported a failure in-band.
    Error(String),
}

/// Token counts for one step, or summed over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Tokens spent on reasoning; already included in `output_tokens` by
    /// providers that report both.
    #[serde(default)]
    pub reasoning_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            ..Default::default()
        }
    }

    /// Input plus output tokens.
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Add another step's counts to these.
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.reasoning_tokens += other.reasoning_tokens;
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    EndTurn,
    MaxTokens,
    /// The step ended to let tool calls run.
    ToolUse,
    ContentFilter,
    Other,
}

impl FinishReason {
    /// Map an OpenAI-compatible `finish_reason` value.
    pub fn from_openai(reason: &str) -> Self {
        match reason {
            "stop" => Self::EndTurn,
            "length" => Self::MaxTokens,
            "tool_calls" | "function_call" => Self::ToolUse,
            "content_filter" => Self::ContentFilter,
            _ => Self::Other,
        }
    }
}
