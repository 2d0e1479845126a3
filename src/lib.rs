//! # Evidentiary Case-Law Retrieval Engine
//!
//! ## Overview
//! This library retrieves and ranks judicial opinions relevant to a legal
//! evidentiary question, then extracts quotable passages that support a
//! best-fit case plus backup authorities.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `providers`: Clients for the external search and content providers
//! - `candidates`: Normalization and deduplication of raw provider results
//! - `authority`: Precedential-weight classification
//! - `ranking`: Relevance scoring and ordering of candidates
//! - `text_cleaning`: Boilerplate and navigation-chrome removal
//! - `snippets`: Probative excerpt selection and labeling
//! - `explain`: "Why it fits" narrative assembly
//! - `pipeline`: End-to-end orchestration of a single query
//! - `api`: REST boundary
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: A structured query (rule, jurisdiction, fact pattern, filters)
//! - **Output**: A ranked, deduplicated, snippet-annotated result set with a
//!   designated best-fit case and explanatory bullets
//! - **Degradation**: Provider failures never abort a query; they shrink it
//!
//! ## Usage
//! ```rust,no_run
//! use evidence_search::{config::Config, pipeline::SearchPipeline, CaseQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let pipeline = SearchPipeline::from_config(&config)?;
//!     let results = pipeline
//!         .run(&CaseQuery {
//!             rule: "FRE 403".into(),
//!             court_id: "ca9".into(),
//!             fact_pattern: "graphic photos offered despite a stipulation".into(),
//!             prefer_binding: true,
//!             include_persuasive: true,
//!             only_published: false,
//!             time_window_years: 15,
//!         })
//!         .await?;
//!     println!("best fit: {}", results.best_fit.name);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod authority;
pub mod candidates;
pub mod config;
pub mod errors;
pub mod explain;
pub mod pipeline;
pub mod providers;
pub mod ranking;
pub mod rules;
pub mod snippets;
pub mod text_cleaning;

// Boundary
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, SearchError};
pub use pipeline::SearchPipeline;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured query submitted at the boundary. Immutable for the lifetime
/// of one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseQuery {
    /// Rule identifier as typed by the user, e.g. "FRE 403"
    pub rule: String,
    /// Jurisdiction identifier, e.g. "ca9"
    pub court_id: String,
    /// Free-text description of the evidentiary dispute
    pub fact_pattern: String,
    /// Pin a binding-authority case to the top slot when one exists
    pub prefer_binding: bool,
    /// Keep persuasive-authority cases in the result set
    pub include_persuasive: bool,
    /// Favor the authoritative case-law provider's published opinions
    pub only_published: bool,
    /// Look-back window in years; the current year counts as age zero
    pub time_window_years: u32,
}

/// Which provider produced a candidate. The ranking step awards the
/// published-status bonus only to the authoritative case-law provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// Semantic document-search provider
    Semantic,
    /// Case-law full-text search provider
    CaseLaw,
}

/// A retrieved opinion before enrichment. Produced fresh per query and
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Jurisdiction identifier when the provider supplied one
    pub court_id: Option<String>,
    /// Human-readable court label for display
    pub court_label: String,
    /// Publication year, best-effort parsed
    pub year: i32,
    /// Source URL; the unique key for deduplication
    pub url: String,
    pub source: CandidateSource,
    /// Short text from the retrieval step, if any
    pub summary_text: Option<String>,
}

impl Candidate {
    /// All free text known for this candidate, used for keyword scoring.
    pub fn scoring_text(&self) -> String {
        match &self.summary_text {
            Some(summary) => format!("{} {}", self.name, summary),
            None => self.name.clone(),
        }
    }
}

/// Precedential weight of a case relative to the querying jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    Binding,
    Persuasive,
    District,
    Older,
}

/// A labeled excerpt from an opinion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Semantic role, e.g. "The test", "Relevant excerpt"
    pub label: String,
    pub text: String,
    /// Highlighted sub-span within the text, when one was selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

/// The enriched, user-facing form of a candidate. Created once per query,
/// immutable afterward. Always carries at least one snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub id: String,
    pub name: String,
    pub court_label: String,
    pub year: i32,
    pub authority: Authority,
    pub issue_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub snippets: Vec<Snippet>,
}

/// Short rule definition shown alongside the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleExplainer {
    pub title: String,
    pub text: String,
}

/// Candidate counts before and after deduplication, returned only when the
/// server runs with debug output enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDebug {
    pub provider_count: usize,
    pub merged_count: usize,
}

/// Terminal aggregate of one pipeline invocation; the sole artifact
/// returned to the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub best_fit: CaseResult,
    pub cases: Vec<CaseResult>,
    pub why_fits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_explainer: Option<RuleExplainer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<SearchDebug>,
}

/// Application state shared across API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub pipeline: Arc<pipeline::SearchPipeline>,
}
