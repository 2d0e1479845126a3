//! # Case-Law Search Provider Client
//!
//! ## Purpose
//! HTTP client for the case-law full-text search REST API. Used as an
//! optional secondary candidate source alongside the semantic provider.
//!
//! ## Input/Output Specification
//! - **Input**: Full-text query with court, date and publication filters
//! - **Output**: Opinion records (name, court, filing date, URL)
//! - **Degradation**: Missing token yields empty results with a warning

use super::{OpinionHit, OpinionQuery, OpinionSearch};
use crate::config::CaseLawProviderConfig;
use crate::errors::{Result, SearchError};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the case-law full-text search API
pub struct CaseLawClient {
    config: CaseLawProviderConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct OpinionSearchResponse {
    #[serde(default)]
    results: Vec<WireOpinion>,
}

/// Wire format of one opinion record. Many more fields exist upstream; only
/// these are consumed.
#[derive(Debug, Deserialize)]
struct WireOpinion {
    id: u64,
    absolute_url: String,
    #[serde(rename = "caseName")]
    case_name: Option<String>,
    #[serde(rename = "dateFiled")]
    date_filed: Option<String>,
    court: Option<String>,
}

/// Convert "last N years" into an ISO date string for the filing-date filter
pub fn iso_date_years_ago(years: u32) -> String {
    let today = Utc::now().date_naive();
    let year = today.year() - years as i32;
    // Clamp Feb 29 rather than fail on non-leap target years
    let shifted = today
        .with_year(year)
        .unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(year, today.month(), 28).unwrap_or(today));
    shifted.format("%Y-%m-%d").to_string()
}

impl CaseLawClient {
    /// Create a new client. Missing credentials are permitted; calls will
    /// degrade to empty results.
    pub fn new(config: CaseLawProviderConfig) -> Result<Self> {
        if config.enabled && config.api_token.is_none() {
            warn!("case-law API token is not set; opinion search will be degraded");
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
}

#[async_trait]
impl OpinionSearch for CaseLawClient {
    async fn search_opinions(&self, query: OpinionQuery) -> Result<Vec<OpinionHit>> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }
        let token = match &self.config.api_token {
            Some(token) => token,
            None => return Ok(Vec::new()),
        };

        let url = format!("{}/api/rest/v4/search/", self.config.base_url);
        debug!("case-law provider request: {}", url);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("type", "o".to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        if let Some(court_id) = &query.court_id {
            params.push(("court", court_id.clone()));
        }
        if let Some(date_min) = &query.date_min {
            params.push(("date_filed_min", date_min.clone()));
        }
        if query.only_published {
            params.push(("order_by", "dateFiled desc".to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("Authorization", format!("Token {}", token))
            .send()
            .await
            .map_err(|e| SearchError::Network {
                details: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SearchError::ProviderUnauthorized {
                provider: "caselaw".to_string(),
                details: format!("HTTP {}", status),
            });
        }
        if !status.is_success() {
            return Err(SearchError::ProviderUnavailable {
                provider: "caselaw".to_string(),
                details: format!("HTTP {}", status),
            });
        }

        let parsed: OpinionSearchResponse =
            response.json().await.map_err(|e| SearchError::DataParsing {
                source_name: "caselaw".to_string(),
                details: e.to_string(),
            })?;

        Ok(parsed
            .results
            .into_iter()
            .map(|wire| OpinionHit {
                id: wire.id.to_string(),
                case_name: wire.case_name,
                date_filed: wire.date_filed,
                court: wire.court,
                absolute_url: wire.absolute_url,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_date_is_n_years_back() {
        let now_year = Utc::now().date_naive().year();
        let date = iso_date_years_ago(10);
        assert!(date.starts_with(&format!("{}-", now_year - 10)));
        assert_eq!(date.len(), 10);
    }

    #[test]
    fn iso_date_zero_years_is_today_year() {
        let now_year = Utc::now().date_naive().year();
        assert!(iso_date_years_ago(0).starts_with(&now_year.to_string()));
    }
}
