//! Terminal rendering of runs and events.

use serde_json::Value;
use std::io::{self, Write};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use vagent_core::{AgentEvent, AgentResult};

/// Lines of a tool result shown before eliding the rest.
const PREVIEW_LINES: usize = 8;

/// One-line rendering of a tool call.
pub fn format_tool_call(name: &str, arguments: &Value) -> String {
    let args = match arguments {
        Value::Object(map) if map.is_empty() => String::new(),
        Value::String(raw) => format!(" {raw}"),
        other => format!(" {other}"),
    };
    format!("[tool] {name}{args}")
}

/// The first lines of a tool result, indented.
pub fn preview(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = lines
        .iter()
        .take(PREVIEW_LINES)
        .map(|line| format!("  {line}"))
        .collect();
    if lines.len() > PREVIEW_LINES {
        out.push(format!("  ... ({} more lines)", lines.len() - PREVIEW_LINES));
    }
    out.join("\n")
}

/// Text to print for a streaming event, if any.
pub fn render_event(event: &AgentEvent) -> Option<String> {
    match event {
        AgentEvent::TextDelta(delta) => Some(delta.clone()),
        AgentEvent::ToolCall {
            name, arguments, ..
        } => Some(format!("\n{}\n", format_tool_call(name, arguments))),
        AgentEvent::ToolResult { result, .. } => Some(format!("{}\n", preview(result))),
        AgentEvent::StepStarted { .. }
        | AgentEvent::ReasoningDelta(_)
        | AgentEvent::Finished { .. } => None,
    }
}

/// Print events to stdout until the sender is dropped.
pub fn spawn_printer(mut events: UnboundedReceiver<AgentEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(event) = events.recv().await {
            if let Some(text) = render_event(&event) {
                let _ = write!(stdout, "{text}");
                let _ = stdout.flush();
            }
        }
    })
}

/// Full plain-text report of a finished run.
pub fn format_result(result: &AgentResult) -> String {
    let mut out = String::new();
    for call in &result.tool_calls {
        out.push_str(&format_tool_call(&call.name, &call.arguments));
        out.push('\n');
        out.push_str(&preview(&call.result));
        out.push('\n');
    }
    if !result.tool_calls.is_empty() {
        out.push('\n');
    }
    if !result.text.is_empty() {
        out.push_str(&result.text);
        out.push_str("\n\n");
    }
    out.push_str(&format_outcome(result));
    out
}

/// Closing status line.
pub fn format_outcome(result: &AgentResult) -> String {
    let steps = if result.step_count == 1 {
        "1 step".to_string()
    } else {
        format!("{} steps", result.step_count)
    };
    format!(
        "[{}: {}, {} tool calls, {} tokens]",
        result.outcome,
        steps,
        result.tool_calls.len(),
        result.usage.total()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use vagent_core::{RunOutcome, ToolCallRecord};
    use vagent_provider::Usage;

    fn result(outcome: RunOutcome, calls: Vec<ToolCallRecord>) -> AgentResult {
        AgentResult {
            text: "All done.".into(),
            step_count: calls.len() + 1,
            tool_calls: calls,
            reasoning: None,
            files: BTreeMap::new(),
            outcome,
            usage: Usage::new(120, 30),
            messages: Vec::new(),
        }
    }

    #[test]
    fn test_format_tool_call() {
        assert_eq!(
            format_tool_call("run_shell", &json!({"command": "ls"})),
            r#"[tool] run_shell {"command":"ls"}"#
        );
        assert_eq!(format_tool_call("run_shell", &json!({})), "[tool] run_shell");
        assert_eq!(
            format_tool_call("read_file", &json!("{broken")),
            "[tool] read_file {broken"
        );
    }

    #[test]
    fn test_preview_elides_long_results() {
        let text = (1..=10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let out = preview(&text);
        assert!(out.starts_with("  1\n  2"));
        assert!(out.ends_with("  ... (2 more lines)"));
        assert!(!out.contains("  9"));
    }

    #[test]
    fn test_render_event() {
        assert_eq!(
            render_event(&AgentEvent::TextDelta("hi".into())).as_deref(),
            Some("hi")
        );
        assert!(render_event(&AgentEvent::StepStarted { step: 1 }).is_none());
        let rendered = render_event(&AgentEvent::ToolResult {
            id: "c1".into(),
            name: "run_shell".into(),
            result: "/home/user".into(),
        });
        assert_eq!(rendered.as_deref(), Some("  /home/user\n"));
    }

    #[test]
    fn test_format_result() {
        let calls = vec![ToolCallRecord {
            name: "run_shell".into(),
            arguments: json!({"command": "pwd"}),
            result: "/home/user".into(),
        }];
        let out = format_result(&result(RunOutcome::Completed, calls));
        assert_eq!(
            out,
            "[tool] run_shell {\"command\":\"pwd\"}\n  /home/user\n\nAll done.\n\n\
             [completed: 2 steps, 1 tool calls, 150 tokens]"
        );
    }

    #[test]
    fn test_format_outcome_step_limit() {
        let out = format_outcome(&result(RunOutcome::StepLimitReached, Vec::new()));
        assert_eq!(out, "[step_limit_reached: 1 step, 0 tool calls, 150 tokens]");
    }
}
