//! Paper search tool.

use crate::error::ResearchError;
use crate::research::{BoxedResearchBackend, Paper, PaperQuery};
use crate::{parse_args, Tool, ToolContext, ToolOutput, ToolResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

/// Results returned when the model gives no limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Hard cap on results per search.
pub const MAX_LIMIT: usize = 50;

const AUTHORS_PREVIEW: usize = 80;
const ABSTRACT_PREVIEW: usize = 200;

/// Search the paper database.
pub struct SearchPapersTool {
    backend: BoxedResearchBackend,
}

impl SearchPapersTool {
    pub fn new(backend: BoxedResearchBackend) -> Self {
        Self { backend }
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: Option<String>,
    title_contains: Option<String>,
    abstract_contains: Option<String>,
    author: Option<String>,
    published_after: Option<String>,
    published_before: Option<String>,
    limit: Option<usize>,
}

/// Models like to send `""` for "no filter".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>, ResearchError> {
    non_empty(value)
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|_| ResearchError::invalid_date(v))
        })
        .transpose()
}

impl TryFrom<SearchArgs> for PaperQuery {
    type Error = ResearchError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            query: non_empty(args.query),
            title_contains: non_empty(args.title_contains),
            abstract_contains: non_empty(args.abstract_contains),
            author: non_empty(args.author),
            published_after: parse_date(args.published_after)?,
            published_before: parse_date(args.published_before)?,
            limit: args.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        })
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Render search hits the way the model sees them.
pub fn format_papers(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return "No papers found matching criteria.".to_string();
    }

    let mut out = format!("Found {} papers:\n\n", papers.len());
    for paper in papers {
        out.push_str(&format!(
            "[{}] {} ({})\n",
            paper.code, paper.title, paper.published
        ));
        out.push_str(&format!(
            "  Authors: {}\n",
            preview(&paper.authors, AUTHORS_PREVIEW)
        ));
        if let Some(similarity) = paper.similarity {
            out.push_str(&format!("  Similarity: {similarity:.3}\n"));
        }
        if let Some(abstract_text) = paper.abstract_text.as_deref() {
            out.push_str(&format!(
                "  Abstract: {}\n",
                preview(abstract_text, ABSTRACT_PREVIEW)
            ));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for SearchPapersTool {
    fn id(&self) -> &str {
        "search_papers"
    }

    fn description(&self) -> &str {
        r#"Searches the research paper database.

Usage:
- Use `query` for a free-text topic search; results are ranked by relevance.
- Without `query`, matching papers are returned newest first.
- Filters are case-insensitive substrings; dates are YYYY-MM-DD and inclusive.
- Returns at most `limit` papers (default 10, max 50)."#
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-text topic to search for"
                },
                "title_contains": {
                    "type": "string",
                    "description": "Only papers whose title contains this text"
                },
                "abstract_contains": {
                    "type": "string",
                    "description": "Only papers whose abstract contains this text"
                },
                "author": {
                    "type": "string",
                    "description": "Only papers with a matching author"
                },
                "published_after": {
                    "type": "string",
                    "description": "Earliest publication date (YYYY-MM-DD)"
                },
                "published_before": {
                    "type": "string",
                    "description": "Latest publication date (YYYY-MM-DD)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results (default 10, max 50)"
                }
            }
        })
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> ToolResult<ToolOutput> {
        let args: SearchArgs = parse_args(args)?;
        let query = PaperQuery::try_from(args)?;
        let papers = self.backend.search(&query).await?;

        Ok(
            ToolOutput::new("Search papers", format_papers(&papers))
                .with_metadata(json!({ "count": papers.len() })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::MockResearchBackend;
    use crate::shared_fs;
    use mockall::predicate::function;
    use std::sync::Arc;
    use vagent_vfs::VirtualFileSystem;

    fn ctx() -> ToolContext {
        ToolContext::new(shared_fs(VirtualFileSystem::new()))
    }

    fn paper(code: &str) -> Paper {
        Paper {
            code: code.to_string(),
            title: "Sparse Attention".to_string(),
            authors: "A. Lovelace".to_string(),
            published: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            abstract_text: None,
            similarity: None,
        }
    }

    #[test]
    fn test_format_papers() {
        let mut first = paper("2401.00001");
        first.similarity = Some(0.75);
        first.abstract_text = Some("x".repeat(250));
        first.authors = "y".repeat(90);
        let second = paper("2401.00002");

        let text = format_papers(&[first, second]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Found 2 papers:");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "[2401.00001] Sparse Attention (2024-01-05)");
        assert_eq!(lines[3], format!("  Authors: {}...", "y".repeat(80)));
        assert_eq!(lines[4], "  Similarity: 0.750");
        assert_eq!(lines[5], format!("  Abstract: {}...", "x".repeat(200)));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "[2401.00002] Sparse Attention (2024-01-05)");
        assert_eq!(lines[8], "  Authors: A. Lovelace");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_format_no_papers() {
        assert_eq!(format_papers(&[]), "No papers found matching criteria.");
    }

    #[tokio::test]
    async fn test_search_builds_query() {
        let mut backend = MockResearchBackend::new();
        backend
            .expect_search()
            .with(function(|q: &PaperQuery| {
                q.query.as_deref() == Some("attention")
                    && q.author.is_none()
                    && q.published_after == NaiveDate::from_ymd_opt(2024, 1, 1)
                    && q.limit == MAX_LIMIT
            }))
            .times(1)
            .returning(|_| Ok(vec![paper("2401.00001")]));

        let tool = SearchPapersTool::new(Arc::new(backend));
        let output = tool
            .execute(
                json!({
                    "query": "attention",
                    "author": "",
                    "published_after": "2024-01-01",
                    "limit": 500
                }),
                &ctx(),
            )
            .await
            .unwrap();
        assert!(output.output.starts_with("Found 1 papers:"));
        assert_eq!(output.metadata["count"], 1);
    }

    #[tokio::test]
    async fn test_search_default_limit() {
        let mut backend = MockResearchBackend::new();
        backend
            .expect_search()
            .with(function(|q: &PaperQuery| q.limit == DEFAULT_LIMIT))
            .returning(|_| Ok(vec![]));

        let tool = SearchPapersTool::new(Arc::new(backend));
        let output = tool.execute(json!({}), &ctx()).await.unwrap();
        assert_eq!(output.output, "No papers found matching criteria.");
    }

    #[tokio::test]
    async fn test_search_rejects_bad_date() {
        let backend = MockResearchBackend::new();
        let tool = SearchPapersTool::new(Arc::new(backend));
        let err = tool
            .execute(json!({"published_before": "last week"}), &ctx())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_tool_text(),
            "Error: Invalid date 'last week' (expected YYYY-MM-DD)"
        );
    }
}
