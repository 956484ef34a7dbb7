//! # Gemini API Client
//!
//! HTTP client for the Google Generative Language `generateContent`
//! endpoint. Maps every upstream failure into [`InsightError::Api`] with
//! the HTTP status in the message, so the retry layer's rate-limit
//! classification fires on genuine 429 responses.

use crate::client::generative::GenerativeClient;
use crate::error::{InsightError, InsightResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Configuration for the Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL of the generative API
    pub base_url: String,
    /// Model identifier (e.g., "gemini-1.5-flash")
    pub model: String,
    /// API credential
    pub api_key: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

// Wire types for the generateContent request/response shapes

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// HTTP client for the Gemini generative API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

impl GeminiClient {
    /// Create a new client from configuration.
    ///
    /// Fails only on malformed configuration (empty credential or an HTTP
    /// client that cannot be constructed), never on upstream state.
    pub fn new(config: GeminiConfig) -> InsightResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(InsightError::Configuration(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InsightError::Configuration(format!("HTTP client build failed: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> InsightResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Dispatching generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| InsightError::Api(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Gemini API returned an error status");
            return Err(InsightError::Api(format!(
                "Gemini API returned {status}: {body}"
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Api(format!("Gemini response body unreadable: {e}")))?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                InsightError::MalformedResponse("Gemini response contained no candidates".into())
            })?;

        debug!(response_chars = text.len(), "Gemini responded");
        Ok(text)
    }

    fn backend_name(&self) -> &'static str {
        "gemini"
    }
}
