//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the retrieval engine, supporting TOML files
//! and environment variable overrides with validation and type-safe access.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation, cross-field checks
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values
//!
//! ## Usage
//! ```rust
//! use evidence_search::config::Config;
//!
//! let config = Config::default();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// External provider settings
    pub providers: ProvidersConfig,
    /// Pipeline behavior
    pub pipeline: PipelineConfig,
    /// Relevance scoring weights
    pub ranking: RankingConfig,
    /// Boilerplate-removal patterns
    pub cleaning: CleaningConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for web frontends
    pub enable_cors: bool,
    /// Minimum fact-pattern length accepted at the boundary
    pub min_fact_pattern_length: usize,
    /// Include candidate-count debug info in responses
    pub debug_responses: bool,
}

/// External provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Semantic document-search provider
    pub semantic: SemanticProviderConfig,
    /// Case-law full-text search provider
    pub caselaw: CaseLawProviderConfig,
}

/// Semantic document-search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticProviderConfig {
    /// API base URL
    pub base_url: String,
    /// API key; absent means the provider degrades to empty results
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Results requested from the case-law repository domain
    pub caselaw_num_results: usize,
    /// Results requested from the secondary commentary domain
    pub commentary_num_results: usize,
    /// Domain hosting the case-law repository
    pub caselaw_domain: String,
    /// Domain hosting secondary commentary
    pub commentary_domain: String,
    /// Domain hosting rule text
    pub rule_text_domain: String,
    /// URL path marker identifying opinion pages
    pub opinion_path_marker: String,
}

/// Case-law full-text search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseLawProviderConfig {
    /// Whether to query this provider at all
    pub enabled: bool,
    /// API base URL
    pub base_url: String,
    /// API token; absent means the provider degrades to empty results
    pub api_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum opinions per search
    pub page_size: usize,
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of cases kept after ranking
    pub top_n: usize,
    /// Minimum surviving snippet length in characters
    pub min_snippet_length: usize,
    /// Fallback summary truncation length in characters
    pub summary_truncate_length: usize,
    /// Maximum snippets per case
    pub max_snippets: usize,
    /// Budget for one candidate's enrichment, in milliseconds; an elapsed
    /// budget degrades that candidate to a placeholder snippet
    pub enrichment_timeout_ms: u64,
    /// Minimum paragraph length considered by the paragraph-scoring strategy
    pub min_paragraph_length: usize,
}

/// How candidates are ordered before truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingMode {
    /// Score candidates with the weights below (canonical)
    Scored,
    /// Trust the ranking order the providers returned
    ProviderOrder,
}

/// Relevance scoring weights. Injectable so ranking can be tuned and tested
/// without touching ranker logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub mode: RankingMode,
    /// Candidate text mentions the rule token
    pub rule_match: f64,
    /// Candidate text mentions a generic domain phrase
    pub domain_phrase: f64,
    /// Candidate jurisdiction equals the query jurisdiction
    pub jurisdiction_match: f64,
    /// Additional jurisdiction bonus when binding authority is preferred
    pub prefer_binding_boost: f64,
    /// Candidate falls within the requested time window
    pub within_window: f64,
    /// Penalty for candidates outside the window
    pub outside_window: f64,
    /// Published-opinion bonus for the authoritative case-law provider
    pub published_bonus: f64,
    /// Keyword weights awarded only when the keyword appears in both the
    /// candidate text and the fact pattern
    pub keyword_weights: Vec<KeywordWeight>,
    /// Phrases that count as a generic domain match
    pub domain_phrases: Vec<String>,
}

/// One weighted co-occurrence keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub term: String,
    pub weight: f64,
}

/// Boilerplate-removal patterns. Sentence and paragraph splitting by
/// punctuation is a lossy heuristic; the boundary expressions live here so
/// they can be tuned for jurisdictions with different citation conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Inline patterns removed anywhere in the text
    pub inline_patterns: Vec<String>,
    /// Patterns that disqualify a whole line
    pub drop_line_patterns: Vec<String>,
    /// Sentence boundary expression used by snippet extraction
    pub sentence_boundary_pattern: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("EVIDENCE_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("EVIDENCE_SEARCH_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(key) = std::env::var("SEMANTIC_SEARCH_API_KEY") {
            self.providers.semantic.api_key = Some(key);
        }
        if let Ok(token) = std::env::var("CASELAW_API_TOKEN") {
            self.providers.caselaw.api_token = Some(token);
        }
        if let Ok(level) = std::env::var("EVIDENCE_SEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.pipeline.top_n == 0 {
            return Err(SearchError::ValidationFailed {
                field: "pipeline.top_n".to_string(),
                reason: "Result count must be greater than zero".to_string(),
            });
        }

        if self.pipeline.max_snippets == 0 {
            return Err(SearchError::ValidationFailed {
                field: "pipeline.max_snippets".to_string(),
                reason: "Snippet cap must be greater than zero".to_string(),
            });
        }

        if self.pipeline.min_snippet_length >= self.pipeline.summary_truncate_length {
            return Err(SearchError::ValidationFailed {
                field: "pipeline.min_snippet_length".to_string(),
                reason: "Minimum snippet length must be below the summary truncation length"
                    .to_string(),
            });
        }

        // Patterns must compile; fail startup rather than the first query
        for pattern in self
            .cleaning
            .inline_patterns
            .iter()
            .chain(self.cleaning.drop_line_patterns.iter())
            .chain(std::iter::once(&self.cleaning.sentence_boundary_pattern))
        {
            regex::Regex::new(pattern).map_err(|e| SearchError::ValidationFailed {
                field: "cleaning".to_string(),
                reason: format!("Invalid pattern '{}': {}", pattern, e),
            })?;
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            min_fact_pattern_length: 20,
            debug_responses: false,
        }
    }
}

impl Default for SemanticProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exa.ai".to_string(),
            api_key: None,
            timeout_seconds: 20,
            caselaw_num_results: 7,
            commentary_num_results: 3,
            caselaw_domain: "courtlistener.com".to_string(),
            commentary_domain: "justia.com".to_string(),
            rule_text_domain: "law.cornell.edu".to_string(),
            opinion_path_marker: "/opinion/".to_string(),
        }
    }
}

impl Default for CaseLawProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.courtlistener.com".to_string(),
            api_token: None,
            timeout_seconds: 20,
            page_size: 25,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            min_snippet_length: 40,
            summary_truncate_length: 280,
            max_snippets: 3,
            enrichment_timeout_ms: 15_000,
            min_paragraph_length: 120,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            mode: RankingMode::Scored,
            rule_match: 3.0,
            domain_phrase: 1.0,
            jurisdiction_match: 4.0,
            prefer_binding_boost: 2.0,
            within_window: 2.0,
            outside_window: -1.0,
            published_bonus: 1.0,
            keyword_weights: vec![
                KeywordWeight {
                    term: "unfair prejudice".to_string(),
                    weight: 3.0,
                },
                KeywordWeight {
                    term: "daubert".to_string(),
                    weight: 3.0,
                },
                KeywordWeight {
                    term: "photo".to_string(),
                    weight: 2.0,
                },
                KeywordWeight {
                    term: "stipulation".to_string(),
                    weight: 2.0,
                },
                KeywordWeight {
                    term: "probative".to_string(),
                    weight: 2.0,
                },
            ],
            domain_phrases: vec![
                "evidence".to_string(),
                "admissib".to_string(),
                "objection".to_string(),
            ],
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            inline_patterns: vec![
                // Repository navigation sections embedded mid-text
                r"(?i)###\s*Your Notes\s*\(?\s*edit\s*\)?\s*\(?\s*none\s*\)?\s*###\s*Summaries\s*\(\d+\)".to_string(),
                r"(?i)###\s*Your Notes[^#]*".to_string(),
                r"(?i)###\s*Summaries\s*\(\d+\)".to_string(),
                r"(?i)\(\s*edit\s*\)".to_string(),
                r"(?i)\(\s*none\s*\)".to_string(),
            ],
            drop_line_patterns: vec![
                r"(?i)please help us improve".to_string(),
                r"(?i)skip to main content".to_string(),
                r"(?i)search cornell".to_string(),
                r"(?i)cornell law school".to_string(),
                r"(?i)legal information institute".to_string(),
                // Standalone bracketed nav labels like [Search Cornell]
                r"^\[[^\]]+\]$".to_string(),
                r"(?i)^###\s*Your Notes".to_string(),
                r"(?i)^###\s*Summaries".to_string(),
                r"(?i)^\s*\(?\s*edit\s*\)?\s*$".to_string(),
                r"(?i)^\s*\(?\s*none\s*\)?\s*$".to_string(),
            ],
            sentence_boundary_pattern: r"[.!?]+\s+".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::from_file("/nonexistent/config.toml").unwrap();
        assert_eq!(config.pipeline.top_n, 3);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[pipeline]\ntop_n = 5\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.pipeline.top_n, 5);
        // Untouched sections keep defaults
        assert_eq!(config.pipeline.max_snippets, 3);
    }

    #[test]
    fn zero_top_n_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pipeline]\ntop_n = 0\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn bad_cleaning_pattern_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cleaning]\ninline_patterns = [\"(unclosed\"]\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
