//! Configuration for the insights core.
//!
//! All tuning knobs live here with production defaults baked into
//! `Default` implementations. `InsightsConfig::from_env()` layers
//! environment overrides on top; a missing `GEMINI_API_KEY` is a silent
//! degraded mode (every operation still answers via fallback), never a
//! construction error.

use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the generative API credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for a single circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u32,

    /// Time to wait in open state before allowing a recovery probe
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> InsightResult<()> {
        if self.failure_threshold == 0 {
            return Err(InsightError::Configuration(
                "failure_threshold must be greater than 0".to_string(),
            ));
        }

        if self.failure_threshold > 100 {
            return Err(InsightError::Configuration(
                "failure_threshold should not exceed 100".to_string(),
            ));
        }

        if self.reset_timeout.is_zero() {
            return Err(InsightError::Configuration(
                "reset_timeout must be greater than 0".to_string(),
            ));
        }

        if self.reset_timeout > Duration::from_secs(600) {
            return Err(InsightError::Configuration(
                "reset_timeout should not exceed 600 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the TTL response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied when a `set` does not specify one
    pub default_ttl: Duration,

    /// TTL applied to successful generative responses (longer than the
    /// generic default because upstream calls are expensive)
    pub response_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(5 * 60),
            response_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> InsightResult<()> {
        if self.default_ttl.is_zero() {
            return Err(InsightError::Configuration(
                "default_ttl must be greater than 0".to_string(),
            ));
        }

        if self.response_ttl < self.default_ttl {
            return Err(InsightError::Configuration(
                "response_ttl should not be shorter than default_ttl".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the serial request queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Fixed delay between consecutive upstream requests
    pub inter_task_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_task_delay: Duration::from_millis(100),
        }
    }
}

/// Configuration for rate-limit retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Backoff delays, one per retry attempt
    pub schedule: Vec<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            schedule: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ],
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> InsightResult<()> {
        if self.schedule.len() > 10 {
            return Err(InsightError::Configuration(
                "retry schedule should not exceed 10 attempts".to_string(),
            ));
        }

        Ok(())
    }
}

/// Top-level configuration for the insights service
#[derive(Debug, Clone)]
pub struct InsightsConfig {
    /// Generative API credential; `None` degrades to fallback-only mode
    pub api_key: Option<String>,
    /// Model identifier passed to the generative API
    pub model: String,
    /// Base URL of the generative API
    pub base_url: String,
    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
    pub cache: CacheConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub queue: QueueConfig,
    pub retry: RetryConfig,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            request_timeout_ms: 30000,
            cache: CacheConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            queue: QueueConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl InsightsConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads `GEMINI_API_KEY` for the credential and `STOCKSENSE_*`
    /// variables for tuning overrides. Only malformed override values are
    /// errors; a missing credential is not.
    pub fn from_env() -> InsightResult<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("STOCKSENSE_AI_MODEL") {
            config.model = model;
        }

        if let Ok(base_url) = std::env::var("STOCKSENSE_AI_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("STOCKSENSE_AI_TIMEOUT_MS") {
            config.request_timeout_ms = timeout.parse().map_err(|e| {
                InsightError::Configuration(format!("Invalid request_timeout_ms: {e}"))
            })?;
        }

        if let Ok(threshold) = std::env::var("STOCKSENSE_AI_FAILURE_THRESHOLD") {
            config.circuit_breaker.failure_threshold = threshold.parse().map_err(|e| {
                InsightError::Configuration(format!("Invalid failure_threshold: {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the assembled configuration
    pub fn validate(&self) -> InsightResult<()> {
        if self.model.is_empty() {
            return Err(InsightError::Configuration(
                "model must not be empty".to_string(),
            ));
        }

        if self.request_timeout_ms == 0 {
            return Err(InsightError::Configuration(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.cache.validate()?;
        self.circuit_breaker.validate()?;
        self.retry.validate()?;

        Ok(())
    }
}
