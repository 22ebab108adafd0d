//! Model-facing tools for vagent.
//!
//! Six tools are exposed to the model: three over the sandboxed virtual
//! filesystem (`write_file`, `read_file`, `run_shell`) and three over a
//! research backend (`search_papers`, `get_summaries`, `fetch_paper`).
//! Every tool answers with plain text; failures come back as text starting
//! with `Error:` so the model can react within the same run.

pub mod error;
pub mod registry;
pub mod research;

// Tool implementations
pub mod fetch;
pub mod read;
pub mod search;
pub mod shell;
pub mod summaries;
pub mod write;

pub use error::{ResearchError, ResearchResult, ToolError, ToolResult};
pub use registry::ToolRegistry;
pub use research::{
    BoxedResearchBackend, Catalog, CatalogBackend, Paper, PaperQuery, Resolution,
    ResearchBackend,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use vagent_vfs::VirtualFileSystem;

/// A filesystem shared between the tools of one run.
pub type SharedFs = Arc<Mutex<VirtualFileSystem>>;

/// Wrap a filesystem for use by the tools.
pub fn shared_fs(fs: VirtualFileSystem) -> SharedFs {
    Arc::new(Mutex::new(fs))
}

/// Context provided to tools during execution.
#[derive(Clone)]
pub struct ToolContext {
    /// The run's virtual filesystem.
    pub fs: SharedFs,
    /// Cancellation token.
    pub abort: CancellationToken,
}

impl ToolContext {
    pub fn new(fs: SharedFs) -> Self {
        Self {
            fs,
            abort: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_abort(mut self, abort: CancellationToken) -> Self {
        self.abort = abort;
        self
    }

    /// Lock the filesystem.
    ///
    /// A panic in another holder leaves the map intact, so a poisoned lock is
    /// recovered rather than propagated. Never hold the guard across an await.
    pub fn fs(&self) -> MutexGuard<'_, VirtualFileSystem> {
        self.fs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Title/summary of the operation.
    pub title: String,
    /// Output text.
    pub output: String,
    /// Tool-specific metadata.
    pub metadata: Value,
}

impl ToolOutput {
    /// Create a new tool output.
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            metadata: Value::Null,
        }
    }

    /// Add metadata to the output.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The main trait for tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool ID.
    fn id(&self) -> &str;

    /// Get the tool description (for the AI).
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool.
    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput>;
}

/// A boxed tool for dynamic dispatch.
pub type BoxedTool = Arc<dyn Tool>;

/// Decode a tool's arguments into its parameter type.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> ToolResult<T> {
    serde_json::from_value(args)
        .map_err(|e| ToolError::validation(format!("Invalid arguments: {e}")))
}
