//! # API Server Module
//!
//! ## Purpose
//! REST boundary for the retrieval pipeline. Validates inbound queries,
//! invokes the pipeline, and maps outcomes to HTTP responses.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests carrying a `CaseQuery`
//! - **Output**: JSON `SearchResults`, or a generic failure indicator
//! - **Endpoints**: Search, health, index
//!
//! ## Error Mapping
//! Malformed or short input is rejected here with 400 before the pipeline
//! runs. An unexpected internal fault surfaces as a generic 500 that never
//! exposes internal detail; a legitimate "no results" answer is a normal 200
//! payload, not an error.

use crate::errors::{Result, SearchError};
use crate::{AppState, CaseQuery};
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use tracing::{error, info};

/// API server wrapping the shared application state
pub struct ApiServer {
    app_state: AppState,
}

impl ApiServer {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until shutdown
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;
        let app_state = self.app_state.clone();

        info!("Starting API server on {}", bind_addr);

        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };
            App::new()
                .wrap(cors)
                .app_data(web::Data::new(app_state.clone()))
                .route("/search", web::post().to(search_handler))
                .route("/health", web::get().to(health_handler))
                .route("/", web::get().to(index_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?;

        server.run().await.map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Reject queries the pipeline should never see
fn validate_query(query: &CaseQuery, min_fact_pattern_length: usize) -> Result<()> {
    if query.rule.trim().is_empty() {
        return Err(SearchError::ValidationFailed {
            field: "rule".to_string(),
            reason: "Rule must not be empty".to_string(),
        });
    }
    if query.fact_pattern.trim().len() < min_fact_pattern_length {
        return Err(SearchError::ValidationFailed {
            field: "factPattern".to_string(),
            reason: format!(
                "Fact pattern must be at least {} characters",
                min_fact_pattern_length
            ),
        });
    }
    Ok(())
}

/// Search endpoint handler
async fn search_handler(
    app_state: web::Data<AppState>,
    request: web::Json<CaseQuery>,
) -> ActixResult<HttpResponse> {
    let query = request.into_inner();

    if let Err(e) = validate_query(&query, app_state.config.server.min_fact_pattern_length) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string(),
        })));
    }

    match app_state.pipeline.run(&query).await {
        Ok(results) => Ok(HttpResponse::Ok().json(results)),
        Err(e) => {
            error!("search pipeline error ({}): {}", e.category(), e);
            // Generic indicator only; internal detail stays in the logs
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Search failed",
            })))
        }
    }
}

/// Health check endpoint handler
async fn health_handler() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Index page handler
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Evidence Search</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Evidence Search API</h1>
        <p>Retrieves and ranks judicial opinions relevant to an evidentiary question.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">POST</span> /search
            <p>Find cases for a rule, jurisdiction, and fact pattern.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /health
            <p>Check service status.</p>
        </div>

        <h2>Example Search Request</h2>
        <pre>{
  "rule": "FRE 403",
  "courtId": "ca9",
  "factPattern": "graphic photos offered despite a stipulation",
  "preferBinding": true,
  "includePersuasive": true,
  "onlyPublished": false,
  "timeWindowYears": 15
}</pre>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(rule: &str, fact_pattern: &str) -> CaseQuery {
        CaseQuery {
            rule: rule.to_string(),
            court_id: "ca9".to_string(),
            fact_pattern: fact_pattern.to_string(),
            prefer_binding: false,
            include_persuasive: true,
            only_published: false,
            time_window_years: 10,
        }
    }

    #[test]
    fn short_fact_pattern_rejected() {
        let q = query("FRE 403", "too short");
        assert!(validate_query(&q, 20).is_err());
    }

    #[test]
    fn empty_rule_rejected() {
        let q = query("  ", "a fact pattern that is certainly long enough");
        assert!(validate_query(&q, 20).is_err());
    }

    #[test]
    fn well_formed_query_accepted() {
        let q = query("FRE 403", "graphic photos offered despite a stipulation");
        assert!(validate_query(&q, 20).is_ok());
    }
}
