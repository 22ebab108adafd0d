//! In-memory research backend.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use vagent_tools::{Paper, PaperQuery, ResearchBackend, ResearchError, ResearchResult};

/// A research backend with fixed contents.
///
/// Search ignores every filter except `limit` and returns papers in insertion
/// order; queries are recorded for inspection. Documents missing from the
/// backend fail with HTTP 404.
#[derive(Default)]
pub struct StaticResearchBackend {
    papers: Vec<Paper>,
    summaries: BTreeMap<String, String>,
    documents: BTreeMap<String, String>,
    queries: Mutex<Vec<PaperQuery>>,
}

impl StaticResearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paper published on `published` (YYYY-MM-DD).
    ///
    /// Panics on a malformed date.
    pub fn with_paper(mut self, code: &str, title: &str, published: &str) -> Self {
        let published = NaiveDate::parse_from_str(published, "%Y-%m-%d")
            .unwrap_or_else(|e| panic!("bad test date {published}: {e}"));
        self.papers.push(Paper {
            code: code.to_string(),
            title: title.to_string(),
            authors: "Test Author".to_string(),
            published,
            abstract_text: None,
            similarity: None,
        });
        self
    }

    /// Set the summary returned for `code` at every resolution.
    pub fn with_summary(mut self, code: &str, summary: &str) -> Self {
        self.summaries.insert(code.to_string(), summary.to_string());
        self
    }

    /// Set the full text returned for `code`.
    pub fn with_document(mut self, code: &str, text: &str) -> Self {
        self.documents.insert(code.to_string(), text.to_string());
        self
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<PaperQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ResearchBackend for StaticResearchBackend {
    async fn search(&self, query: &PaperQuery) -> ResearchResult<Vec<Paper>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        Ok(self.papers.iter().take(query.limit).cloned().collect())
    }

    async fn summaries(
        &self,
        codes: &[String],
        _target_tokens: u32,
    ) -> ResearchResult<BTreeMap<String, String>> {
        Ok(codes
            .iter()
            .filter_map(|c| self.summaries.get(c).map(|s| (c.clone(), s.clone())))
            .collect())
    }

    async fn fetch_document(&self, code: &str) -> ResearchResult<String> {
        self.documents
            .get(code)
            .cloned()
            .ok_or(ResearchError::Http { status: 404 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_backend() {
        let backend = StaticResearchBackend::new()
            .with_paper("1", "One", "2024-01-01")
            .with_paper("2", "Two", "2024-01-02")
            .with_summary("1", "First paper.")
            .with_document("1", "# One");

        let query = PaperQuery {
            limit: 1,
            ..Default::default()
        };
        let hits = backend.search(&query).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(backend.queries(), vec![query]);

        let summaries = backend
            .summaries(&["1".to_string(), "2".to_string()], 1000)
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);

        assert_eq!(backend.fetch_document("1").await.unwrap(), "# One");
        assert!(backend.fetch_document("2").await.is_err());
    }
}
