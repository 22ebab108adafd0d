//! Shell tool - run a command in the sandbox shell.

use crate::{parse_args, Tool, ToolContext, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Run sandbox shell commands.
pub struct ShellTool;

#[derive(Debug, Deserialize)]
struct ShellArgs {
    command: String,
}

#[async_trait]
impl Tool for ShellTool {
    fn id(&self) -> &str {
        "run_shell"
    }

    fn description(&self) -> &str {
        r#"Runs a command in the sandboxed shell.

Supported commands:
- ls [PATH], pwd, cd [PATH], cat PATH, rm PATH
- grep [-A NUM] [-B NUM] PATTERN [PATH]
- echo TEXT [> PATH | >> PATH], mkdir PATH, touch PATH, mv SRC DST

Arguments are split on whitespace; quoting is not supported.
Host programs cannot be executed."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command line to run"
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: ShellArgs = parse_args(args)?;
        let output = ctx.fs().shell().execute(&args.command);
        Ok(ToolOutput::new(args.command, output))
    }
}
