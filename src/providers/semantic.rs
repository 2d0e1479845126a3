//! # Semantic Search Provider Client
//!
//! ## Purpose
//! HTTP client for the semantic document-search service: ranked search over
//! constrained content domains plus content/highlight fetch for known URLs.
//!
//! ## Input/Output Specification
//! - **Input**: Natural-language queries, domain constraints, highlight specs
//! - **Output**: Ranked `DocumentHit`s / extracted `ContentItem`s
//! - **Degradation**: Missing credentials yield empty results with a warning
//!   rather than an error; the pipeline proceeds with what the other
//!   providers return.

use super::{ContentFetch, ContentRequest, ContentItem, DocumentHit, DocumentSearch, HighlightSpec, SearchRequest};
use crate::config::SemanticProviderConfig;
use crate::errors::{Result, SearchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the semantic document-search API
pub struct SemanticSearchClient {
    config: SemanticProviderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_domains: Vec<String>,
    text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlights: Option<&'a HighlightSpec>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentsBody<'a> {
    urls: &'a [String],
    text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlights: Option<&'a HighlightSpec>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<DocumentHit>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    results: Vec<ContentItem>,
}

impl SemanticSearchClient {
    /// Create a new client. Missing credentials are permitted; calls will
    /// degrade to empty results.
    pub fn new(config: SemanticProviderConfig) -> Result<Self> {
        if config.api_key.is_none() {
            warn!("semantic search API key is not set; document search will be degraded");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("evidence-search/0.1")
            .build()
            .map_err(|e| SearchError::Network {
                details: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let api_key = match &self.config.api_key {
            Some(key) => key,
            None => return Ok(None),
        };

        let url = format!("{}{}", self.config.base_url, path);
        debug!("semantic provider request: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SearchError::Network {
                details: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SearchError::ProviderUnauthorized {
                provider: "semantic-search".to_string(),
                details: format!("HTTP {}", status),
            });
        }
        if !status.is_success() {
            return Err(SearchError::ProviderUnavailable {
                provider: "semantic-search".to_string(),
                details: format!("HTTP {}", status),
            });
        }

        let parsed = response.json::<T>().await.map_err(|e| SearchError::DataParsing {
            source_name: "semantic-search".to_string(),
            details: e.to_string(),
        })?;

        Ok(Some(parsed))
    }
}

#[async_trait]
impl DocumentSearch for SemanticSearchClient {
    async fn search(&self, request: SearchRequest) -> Result<Vec<DocumentHit>> {
        let body = SearchBody {
            query: &request.query,
            num_results: request.num_results,
            include_domains: request.include_domains,
            exclude_domains: request.exclude_domains,
            text: request.return_full_text,
            highlights: request.highlights.as_ref(),
        };

        let response: Option<SearchResponse> = self.post_json("/search", &body).await?;
        Ok(response.map(|r| r.results).unwrap_or_default())
    }
}

#[async_trait]
impl ContentFetch for SemanticSearchClient {
    async fn fetch_contents(&self, request: ContentRequest) -> Result<Vec<ContentItem>> {
        let body = ContentsBody {
            urls: &request.urls,
            text: request.return_full_text,
            highlights: request.highlights.as_ref(),
        };

        let response: Option<ContentsResponse> = self.post_json("/contents", &body).await?;
        Ok(response.map(|r| r.results).unwrap_or_default())
    }
}
