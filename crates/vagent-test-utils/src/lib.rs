//! Testing utilities, fixtures, and fakes for vagent.
//!
//! This crate provides common testing infrastructure used across the vagent workspace:
//!
//! - **Providers**: a scripted language model that records every call
//! - **Research**: an in-memory research backend
//! - **Fixtures**: temporary host workspaces and pre-filled sandboxes
//! - **Assertions**: sandbox and host file checks with readable diffs
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use vagent_test_utils::{ScriptedProvider, StaticResearchBackend};
//!
//! #[tokio::test]
//! async fn test_agent_writes_file() {
//!     let model = ScriptedProvider::new()
//!         .with_tool_call("call_1", "write_file", r#"{"path":"a.md","content":"hi"}"#)
//!         .with_response("Done.");
//!
//!     // Drive an AgentLoop with `model`...
//!     assert_eq!(model.call_count(), 2);
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod providers;
pub mod research;

// Re-export commonly used items
pub use fixtures::{BuiltTestWorkspace, TestWorkspace};
pub use providers::{RecordedCall, ScriptedProvider, ScriptedStep};
pub use research::StaticResearchBackend;
