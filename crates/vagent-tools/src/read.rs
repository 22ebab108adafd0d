//! Read tool - read a file from the sandbox.

use crate::{parse_args, Tool, ToolContext, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Read file contents.
pub struct ReadTool;

#[derive(Debug, Deserialize)]
struct ReadArgs {
    path: String,
}

#[async_trait]
impl Tool for ReadTool {
    fn id(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        r#"Reads a file from the sandboxed filesystem and returns its full content.

Relative paths are resolved against the current directory."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file to read"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: ReadArgs = parse_args(args)?;
        let content = ctx.fs().read(&args.path)?;
        Ok(ToolOutput::new(format!("Read {}", args.path), content))
    }
}
