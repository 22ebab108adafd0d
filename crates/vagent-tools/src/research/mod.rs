//! Research backend abstraction.
//!
//! The paper tools never talk to a database or an HTTP server directly: they
//! hold an explicitly constructed [`ResearchBackend`], so tests substitute a
//! fake and concurrent runs share nothing hidden.

pub mod catalog;

pub use catalog::{Catalog, CatalogBackend, SummaryRecord, DEFAULT_PAPERS_URL};

use crate::error::ResearchResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A paper record as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper code (e.g. "2401.12345").
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub authors: String,
    pub published: NaiveDate,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// Relevance to the free-text query, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Search criteria. Every filter is optional; bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperQuery {
    pub query: Option<String>,
    pub title_contains: Option<String>,
    pub abstract_contains: Option<String>,
    pub author: Option<String>,
    pub published_after: Option<NaiveDate>,
    pub published_before: Option<NaiveDate>,
    pub limit: usize,
}

impl Default for PaperQuery {
    fn default() -> Self {
        Self {
            query: None,
            title_contains: None,
            abstract_contains: None,
            author: None,
            published_after: None,
            published_before: None,
            limit: crate::search::DEFAULT_LIMIT,
        }
    }
}

impl PaperQuery {
    /// Free-text query.
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }
}

/// Summary detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Low,
    #[default]
    Medium,
    High,
}

impl Resolution {
    /// Approximate summary length in tokens.
    pub fn target_tokens(&self) -> u32 {
        match self {
            Self::Low => 500,
            Self::Medium => 1000,
            Self::High => 2500,
        }
    }
}

/// Remote paper search, summary lookup and document retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Find papers matching `query`, best first, at most `query.limit`.
    async fn search(&self, query: &PaperQuery) -> ResearchResult<Vec<Paper>>;

    /// For each known code, the stored summary whose length is closest to
    /// `target_tokens`. Unknown codes are absent from the map.
    async fn summaries(
        &self,
        codes: &[String],
        target_tokens: u32,
    ) -> ResearchResult<BTreeMap<String, String>>;

    /// Full document text for a paper.
    async fn fetch_document(&self, code: &str) -> ResearchResult<String>;
}

/// A shared research backend.
pub type BoxedResearchBackend = Arc<dyn ResearchBackend>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolution_targets() {
        assert_eq!(Resolution::default(), Resolution::Medium);
        assert_eq!(Resolution::Low.target_tokens(), 500);
        assert_eq!(Resolution::High.target_tokens(), 2500);
        let parsed: Resolution = serde_json::from_value(json!("high")).unwrap();
        assert_eq!(parsed, Resolution::High);
    }

    #[test]
    fn test_paper_deserialize() {
        let paper: Paper = serde_json::from_value(json!({
            "code": "2401.00001",
            "title": "Attention",
            "published": "2024-01-02",
            "abstract": "We study attention."
        }))
        .unwrap();
        assert_eq!(paper.published, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(paper.abstract_text.as_deref(), Some("We study attention."));
        assert!(paper.authors.is_empty());
        assert!(paper.similarity.is_none());
    }
}
