//! Paper summary tool.

use crate::research::{BoxedResearchBackend, Resolution};
use crate::{parse_args, Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Fetch stored paper summaries.
pub struct GetSummariesTool {
    backend: BoxedResearchBackend,
}

impl GetSummariesTool {
    pub fn new(backend: BoxedResearchBackend) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct SummariesArgs {
    #[serde(alias = "arxiv_codes")]
    codes: Vec<String>,
    #[serde(default)]
    resolution: Resolution,
}

/// Render summaries as `## code` sections separated by rules.
pub fn format_summaries(summaries: &BTreeMap<String, String>) -> String {
    if summaries.is_empty() {
        return "No summaries found for the provided paper codes.".to_string();
    }
    summaries
        .iter()
        .map(|(code, summary)| format!("## {code}\n\n{summary}\n\n---\n"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

#[async_trait]
impl Tool for GetSummariesTool {
    fn id(&self) -> &str {
        "get_summaries"
    }

    fn description(&self) -> &str {
        r#"Gets stored summaries for one or more papers.

Resolution controls the length: "low" (~500 tokens), "medium" (~1000) or "high" (~2500)."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["codes"],
            "properties": {
                "codes": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Paper codes, e.g. [\"2401.12345\"]"
                },
                "resolution": {
                    "type": "string",
                    "enum": ["low", "medium", "high"],
                    "description": "Summary detail level (default medium)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: SummariesArgs = parse_args(args)?;
        let codes: Vec<String> = args
            .codes
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if codes.is_empty() {
            return Err(ToolError::validation("No paper codes provided."));
        }

        let summaries = self
            .backend
            .summaries(&codes, args.resolution.target_tokens())
            .await?;

        Ok(
            ToolOutput::new("Get summaries", format_summaries(&summaries))
                .with_metadata(json!({ "found": summaries.len(), "requested": codes.len() })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::MockResearchBackend;
    use crate::shared_fs;
    use std::sync::Arc;
    use vagent_vfs::VirtualFileSystem;

    fn ctx() -> ToolContext {
        ToolContext::new(shared_fs(VirtualFileSystem::new()))
    }

    #[test]
    fn test_format_summaries() {
        let summaries = BTreeMap::from([
            ("2401.00001".to_string(), "First.".to_string()),
            ("2401.00002".to_string(), "Second.".to_string()),
        ]);
        assert_eq!(
            format_summaries(&summaries),
            "## 2401.00001\n\nFirst.\n\n---\n\n## 2401.00002\n\nSecond.\n\n---"
        );
        assert_eq!(
            format_summaries(&BTreeMap::new()),
            "No summaries found for the provided paper codes."
        );
    }

    #[tokio::test]
    async fn test_resolution_maps_to_tokens() {
        let mut backend = MockResearchBackend::new();
        backend
            .expect_summaries()
            .withf(|codes, tokens| codes.len() == 1 && codes[0] == "2401.00001" && *tokens == 500)
            .times(1)
            .returning(|_, _| {
                Ok(BTreeMap::from([(
                    "2401.00001".to_string(),
                    "Short.".to_string(),
                )]))
            });

        let tool = GetSummariesTool::new(Arc::new(backend));
        let output = tool
            .execute(json!({"codes": [" 2401.00001 "], "resolution": "low"}), &ctx())
            .await
            .unwrap();
        assert!(output.output.contains("## 2401.00001"));
        assert!(output.output.contains("Short."));
    }

    #[tokio::test]
    async fn test_empty_codes() {
        let tool = GetSummariesTool::new(Arc::new(MockResearchBackend::new()));
        let err = tool
            .execute(json!({"codes": []}), &ctx())
            .await
            .unwrap_err();
        assert_eq!(err.to_tool_text(), "Error: No paper codes provided.");
    }

    #[tokio::test]
    async fn test_unknown_resolution() {
        let tool = GetSummariesTool::new(Arc::new(MockResearchBackend::new()));
        let err = tool
            .execute(json!({"codes": ["1"], "resolution": "extreme"}), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
