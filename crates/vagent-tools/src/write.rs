//! Write tool - write a file into the sandbox.

use crate::{parse_args, Tool, ToolContext, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Write file contents.
pub struct WriteTool;

#[derive(Debug, Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[async_trait]
impl Tool for WriteTool {
    fn id(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        r#"Writes a file in the sandboxed filesystem.

Usage:
- Relative paths are resolved against the current directory (initially /home/user).
- Overwrites the file if it already exists."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path", "content"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: WriteArgs = parse_args(args)?;
        let message = ctx.fs().write(&args.path, args.content.as_str());
        debug!(path = %args.path, chars = args.content.chars().count(), "Wrote file");

        Ok(ToolOutput::new(format!("Wrote {}", args.path), message)
            .with_metadata(json!({ "chars": args.content.chars().count() })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{shared_fs, ToolError};
    use vagent_vfs::VirtualFileSystem;

    #[tokio::test]
    async fn test_write_file() {
        let ctx = ToolContext::new(shared_fs(VirtualFileSystem::new()));
        let output = WriteTool
            .execute(json!({"path": "notes.md", "content": "héllo"}), &ctx)
            .await
            .unwrap();

        assert_eq!(output.output, "Successfully wrote 5 chars to /home/user/notes.md");
        assert_eq!(ctx.fs().read("notes.md").unwrap(), "héllo");
    }

    #[tokio::test]
    async fn test_write_requires_content() {
        let ctx = ToolContext::new(shared_fs(VirtualFileSystem::new()));
        let err = WriteTool
            .execute(json!({"path": "notes.md"}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(ctx.fs().is_empty());
    }
}
