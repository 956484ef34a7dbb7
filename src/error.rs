//! Error types for the insights core.
//!
//! Every failure path inside the façade terminates in a deterministic
//! fallback, so these errors are internal signals rather than part of the
//! public operation results. The variants mirror the failure taxonomy of
//! the resilience pipeline: circuit rejection, rate limiting, unparseable
//! model output, and plain upstream failures.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InsightError {
    #[error("Circuit breaker open: {0}")]
    CircuitOpen(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
    #[error("Generative API error: {0}")]
    Api(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Generative client unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for InsightError {
    fn from(error: serde_json::Error) -> Self {
        InsightError::MalformedResponse(format!("JSON parse error: {error}"))
    }
}

impl From<reqwest::Error> for InsightError {
    fn from(error: reqwest::Error) -> Self {
        InsightError::Api(error.to_string())
    }
}

pub type InsightResult<T> = anyhow::Result<T, InsightError>;
