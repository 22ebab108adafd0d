//! Core logic for vagent.
//!
//! This crate provides the coordination layer between the model and the
//! sandbox:
//! - The step-bounded agent loop, batch and streaming
//! - Run results and the tool-call trace
//! - Persistent settings with environment overrides
//! - System prompt generation

pub mod agent;
pub mod config;
pub mod error;
pub mod system_prompt;

pub use agent::{
    AgentConfig, AgentEvent, AgentLoop, AgentResult, RunOutcome, ToolCallRecord, BATCH_MAX_STEPS,
    INTERACTIVE_MAX_STEPS,
};
pub use config::{openrouter_api_key, Settings, API_KEY_ENV};
pub use error::{ConfigError, CoreError, CoreResult};
pub use system_prompt::build_system_prompt;
