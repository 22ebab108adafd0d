//! JSON catalog research backend.
//!
//! Papers and summaries come from a local JSON file; full documents are
//! downloaded over HTTP from `{papers_url}/{code}/paper.md`.

use super::{Paper, PaperQuery, ResearchBackend};
use crate::error::{ResearchError, ResearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use vagent_util::TimingGuard;

/// Default document server.
pub const DEFAULT_PAPERS_URL: &str = "https://arxiv-md.s3.amazonaws.com";

/// Minimum fraction of query terms a paper must contain to be returned.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// A stored summary at one length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub code: String,
    /// Approximate length in tokens.
    pub tokens: u32,
    pub summary: String,
}

/// The on-disk catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub summaries: Vec<SummaryRecord>,
}

/// Research backend over a [`Catalog`].
pub struct CatalogBackend {
    catalog: Catalog,
    client: reqwest::Client,
    papers_url: String,
}

impl CatalogBackend {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            client: reqwest::Client::new(),
            papers_url: DEFAULT_PAPERS_URL.to_string(),
        }
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> ResearchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            papers = catalog.papers.len(),
            summaries = catalog.summaries.len(),
            "Loaded research catalog"
        );
        Ok(Self::new(catalog))
    }

    /// Set the document server base URL.
    pub fn with_papers_url(mut self, url: impl Into<String>) -> Self {
        self.papers_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_filters(paper: &Paper, query: &PaperQuery) -> bool {
    let abstract_text = paper.abstract_text.as_deref().unwrap_or_default();
    query
        .title_contains
        .as_deref()
        .map_or(true, |t| contains_ci(&paper.title, t))
        && query
            .abstract_contains
            .as_deref()
            .map_or(true, |t| contains_ci(abstract_text, t))
        && query
            .author
            .as_deref()
            .map_or(true, |a| contains_ci(&paper.authors, a))
        && query.published_after.map_or(true, |d| paper.published >= d)
        && query.published_before.map_or(true, |d| paper.published <= d)
}

/// Fraction of `terms` present in the paper's title and abstract.
fn similarity(paper: &Paper, terms: &BTreeSet<String>) -> f64 {
    let text = format!(
        "{} {}",
        paper.title,
        paper.abstract_text.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    let hits = terms.iter().filter(|t| text.contains(t.as_str())).count();
    hits as f64 / terms.len() as f64
}

#[async_trait]
impl ResearchBackend for CatalogBackend {
    async fn search(&self, query: &PaperQuery) -> ResearchResult<Vec<Paper>> {
        let _timing = TimingGuard::research("search");
        let terms: BTreeSet<String> = query
            .query
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let candidates = self
            .catalog
            .papers
            .iter()
            .filter(|p| matches_filters(p, query));

        let mut hits: Vec<Paper> = if terms.is_empty() {
            let mut hits: Vec<Paper> = candidates.cloned().collect();
            hits.sort_by(|a, b| b.published.cmp(&a.published));
            hits
        } else {
            let mut hits: Vec<Paper> = candidates
                .filter_map(|p| {
                    let score = similarity(p, &terms);
                    (score >= SIMILARITY_THRESHOLD).then(|| Paper {
                        similarity: Some(score),
                        ..p.clone()
                    })
                })
                .collect();
            hits.sort_by(|a, b| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.published.cmp(&a.published))
            });
            hits
        };
        hits.truncate(query.limit);

        debug!(hits = hits.len(), terms = terms.len(), "Catalog search");
        Ok(hits)
    }

    async fn summaries(
        &self,
        codes: &[String],
        target_tokens: u32,
    ) -> ResearchResult<BTreeMap<String, String>> {
        let mut found = BTreeMap::new();
        for code in codes {
            let closest = self
                .catalog
                .summaries
                .iter()
                .filter(|s| &s.code == code)
                .min_by_key(|s| s.tokens.abs_diff(target_tokens));
            if let Some(record) = closest {
                found.insert(code.clone(), record.summary.clone());
            }
        }
        Ok(found)
    }

    async fn fetch_document(&self, code: &str) -> ResearchResult<String> {
        let _timing = TimingGuard::research(format!("fetch {code}"));
        let url = format!("{}/{}/paper.md", self.papers_url, code);
        debug!(url = %url, "Fetching paper");

        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
