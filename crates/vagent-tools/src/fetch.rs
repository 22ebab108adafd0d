//! Paper download tool.

use crate::research::BoxedResearchBackend;
use crate::{parse_args, Tool, ToolContext, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Directory papers are downloaded into.
pub const PAPERS_DIR: &str = "/home/user/papers";

/// Download a paper into the sandbox.
pub struct FetchPaperTool {
    backend: BoxedResearchBackend,
}

impl FetchPaperTool {
    pub fn new(backend: BoxedResearchBackend) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct FetchArgs {
    #[serde(alias = "arxiv_code")]
    code: String,
}

/// Virtual path a paper is stored at.
pub fn paper_path(code: &str) -> String {
    format!("{PAPERS_DIR}/{code}.md")
}

#[async_trait]
impl Tool for FetchPaperTool {
    fn id(&self) -> &str {
        "fetch_paper"
    }

    fn description(&self) -> &str {
        r#"Downloads the full text of a paper as markdown into /home/user/papers/{code}.md.

Use grep or read_file on the downloaded file to find specific passages."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["code"],
            "properties": {
                "code": {
                    "type": "string",
                    "description": "Paper code, e.g. \"2401.12345\""
                }
            }
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: FetchArgs = parse_args(args)?;
        let code = args.code.trim();
        if code.is_empty() || code.contains('/') {
            return Err(ToolError::validation(format!(
                "Invalid paper code: '{code}'"
            )));
        }

        let document = tokio::select! {
            _ = ctx.abort.cancelled() => return Err(ToolError::Cancelled),
            result = self.backend.fetch_document(code) => result,
        };
        let document = match document {
            Ok(document) => document,
            Err(e) => {
                warn!(code = %code, error = %e, "Paper download failed");
                return Ok(ToolOutput::new(
                    format!("Fetch {code}"),
                    format!("Error: Could not download paper {code} ({e})"),
                ));
            }
        };

        let path = paper_path(code);
        let bytes = document.len();
        ctx.fs().write(&path, document);
        info!(code = %code, bytes, "Downloaded paper");

        Ok(ToolOutput::new(
            format!("Fetch {code}"),
            format!("Downloaded {code} to {path} ({bytes} bytes)"),
        )
        .with_metadata(json!({ "path": path, "bytes": bytes })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResearchError;
    use crate::research::MockResearchBackend;
    use crate::shared_fs;
    use mockall::predicate::eq;
    use std::sync::Arc;
    use vagent_vfs::VirtualFileSystem;

    fn ctx() -> ToolContext {
        ToolContext::new(shared_fs(VirtualFileSystem::new()))
    }

    #[tokio::test]
    async fn test_fetch_writes_into_sandbox() {
        let mut backend = MockResearchBackend::new();
        backend
            .expect_fetch_document()
            .with(eq("2401.00001"))
            .times(1)
            .returning(|_| Ok("# Título".to_string()));

        let ctx = ctx();
        let tool = FetchPaperTool::new(Arc::new(backend));
        let output = tool
            .execute(json!({"code": "2401.00001"}), &ctx)
            .await
            .unwrap();

        assert_eq!(
            output.output,
            "Downloaded 2401.00001 to /home/user/papers/2401.00001.md (9 bytes)"
        );
        assert_eq!(
            ctx.fs().read("papers/2401.00001.md").unwrap(),
            "# Título"
        );
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_text() {
        let mut backend = MockResearchBackend::new();
        backend
            .expect_fetch_document()
            .returning(|_| Err(ResearchError::Http { status: 404 }));

        let ctx = ctx();
        let tool = FetchPaperTool::new(Arc::new(backend));
        let output = tool
            .execute(json!({"arxiv_code": "0000.00000"}), &ctx)
            .await
            .unwrap();

        assert_eq!(
            output.output,
            "Error: Could not download paper 0000.00000 (HTTP 404)"
        );
        assert!(ctx.fs().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_path_in_code() {
        let tool = FetchPaperTool::new(Arc::new(MockResearchBackend::new()));
        let err = tool
            .execute(json!({"code": "../../etc"}), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }
}
