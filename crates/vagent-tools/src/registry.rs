//! Tool registry.

use crate::fetch::FetchPaperTool;
use crate::read::ReadTool;
use crate::research::BoxedResearchBackend;
use crate::search::SearchPapersTool;
use crate::shell::ShellTool;
use crate::summaries::GetSummariesTool;
use crate::write::WriteTool;
use crate::{BoxedTool, ToolContext, ToolError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use vagent_util::TimingGuard;

/// Registry of available tools, ordered by ID.
pub struct ToolRegistry {
    tools: BTreeMap<String, BoxedTool>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry with only the filesystem tools.
    pub fn with_file_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WriteTool));
        registry.register(Arc::new(ReadTool));
        registry.register(Arc::new(ShellTool));
        registry
    }

    /// Create a registry with all built-in tools, the research tools bound
    /// to `backend`.
    pub fn with_builtins(backend: BoxedResearchBackend) -> Self {
        let mut registry = Self::with_file_tools();
        registry.register(Arc::new(SearchPapersTool::new(backend.clone())));
        registry.register(Arc::new(GetSummariesTool::new(backend.clone())));
        registry.register(Arc::new(FetchPaperTool::new(backend)));
        registry
    }

    /// Register a tool, replacing any tool with the same ID.
    pub fn register(&mut self, tool: BoxedTool) {
        self.tools.insert(tool.id().to_string(), tool);
    }

    /// Get a tool by ID.
    pub fn get(&self, id: &str) -> Option<&BoxedTool> {
        self.tools.get(id)
    }

    /// List all tool IDs.
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get all tools.
    pub fn all(&self) -> impl Iterator<Item = &BoxedTool> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Always returns text: failures, including an unknown tool name, are
    /// rendered as `Error: ...`.
    pub async fn invoke(&self, name: &str, args: Value, ctx: &ToolContext) -> String {
        let Some(tool) = self.get(name) else {
            info!(tool = %name, "Model requested unknown tool");
            return ToolError::unknown_tool(name).to_tool_text();
        };

        let _timing = TimingGuard::tool(name);
        match tool.execute(args, ctx).await {
            Ok(output) => output.output,
            Err(e) => {
                debug!(tool = %name, error = %e, "Tool failed");
                e.to_tool_text()
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
