//! # External Provider Module
//!
//! ## Purpose
//! Contracts and clients for the upstream data providers: a semantic
//! document-search service (with content/highlight fetch) and a case-law
//! full-text search service.
//!
//! ## Input/Output Specification
//! - **Input**: Search queries, domain constraints, highlight specs, URLs
//! - **Output**: Ranked document hits, content items, opinion records
//! - **Contract**: Single request/response per call; no streaming, no retries
//!
//! The core depends only on the traits here; the HTTP clients in `semantic`
//! and `caselaw` are one implementation each. Tests substitute stubs.

pub mod caselaw;
pub mod semantic;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use caselaw::CaseLawClient;
pub use semantic::SemanticSearchClient;

/// Query-guided excerpt request attached to a search or content fetch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpec {
    /// Natural-language description of what to highlight
    pub query: String,
    /// Sentences per highlight
    pub num_sentences: usize,
    /// Maximum highlights per document
    pub highlights_per_url: usize,
}

/// Parameters for a semantic document search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub num_results: usize,
    /// Restrict results to these content domains
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
    /// Ask for full document text instead of highlights
    pub return_full_text: bool,
    pub highlights: Option<HighlightSpec>,
}

/// One ranked document from the semantic search provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentHit {
    #[serde(default)]
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub highlights: Option<Vec<String>>,
}

/// Parameters for a content/highlight fetch
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub urls: Vec<String>,
    pub return_full_text: bool,
    pub highlights: Option<HighlightSpec>,
}

/// Extracted content for one URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentItem {
    pub url: String,
    pub text: Option<String>,
    pub highlights: Option<Vec<String>>,
}

/// Parameters for a case-law full-text search
#[derive(Debug, Clone)]
pub struct OpinionQuery {
    pub query: String,
    pub court_id: Option<String>,
    /// Earliest filing date, ISO `YYYY-MM-DD`
    pub date_min: Option<String>,
    pub only_published: bool,
    pub page_size: usize,
}

/// One opinion record from the case-law provider
#[derive(Debug, Clone, Deserialize)]
pub struct OpinionHit {
    pub id: String,
    pub case_name: Option<String>,
    pub date_filed: Option<String>,
    pub court: Option<String>,
    pub absolute_url: String,
}

/// Semantic document search: ranked documents constrained to content domains
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<Vec<DocumentHit>>;
}

/// Content/highlight fetch for known document URLs
#[async_trait]
pub trait ContentFetch: Send + Sync {
    async fn fetch_contents(&self, request: ContentRequest) -> Result<Vec<ContentItem>>;
}

/// Case-law full-text opinion search
#[async_trait]
pub trait OpinionSearch: Send + Sync {
    async fn search_opinions(&self, query: OpinionQuery) -> Result<Vec<OpinionHit>>;
}
