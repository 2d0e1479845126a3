//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the retrieval engine, providing structured
//! error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from providers, parsing, and configuration
//! - **Output**: Structured error types with context
//! - **Error Categories**: Provider, Parsing, Configuration, Validation, API
//!
//! ## Propagation Policy
//! Provider- and extraction-level failures are absorbed inside the pipeline
//! and converted to degraded output; only boundary-level validation and
//! unexpected internal faults surface to the caller as hard errors.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the evidentiary case-law retrieval engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network-related errors from provider calls
    #[error("Network error: {details}")]
    Network { details: String },

    /// Provider rejected or could not serve the request
    #[error("Provider '{provider}' unavailable: {details}")]
    ProviderUnavailable { provider: String, details: String },

    /// Provider credentials missing or rejected
    #[error("Provider '{provider}' is not authorized: {details}")]
    ProviderUnauthorized { provider: String, details: String },

    /// Failed to parse a provider response
    #[error("Failed to parse data from {source_name}: {details}")]
    DataParsing { source_name: String, details: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors at the boundary
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Invalid API request payloads
    #[error("Invalid API request: {details}")]
    InvalidApiRequest { details: String },

    /// Serialization/deserialization errors
    #[error("Serialization failed: {message}")]
    SerializationFailed { message: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Check if the error is recoverable (can be retried by the caller)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::Network { .. } | SearchError::ProviderUnavailable { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Network { .. }
            | SearchError::ProviderUnavailable { .. }
            | SearchError::ProviderUnauthorized { .. } => "provider",
            SearchError::DataParsing { .. } | SearchError::SerializationFailed { .. } => "parsing",
            SearchError::Config { .. } => "configuration",
            SearchError::ValidationFailed { .. } | SearchError::InvalidApiRequest { .. } => "api",
            SearchError::Internal { .. } => "generic",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::SerializationFailed {
            message: format!("JSON serialization error: {}", err),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Network {
            details: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(err: toml::de::Error) -> Self {
        SearchError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<regex::Error> for SearchError {
    fn from(err: regex::Error) -> Self {
        SearchError::Config {
            message: format!("Invalid pattern: {}", err),
        }
    }
}
