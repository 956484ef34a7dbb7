//! # Generative Client Trait
//!
//! The seam between the resilience pipeline and whatever completion API
//! backs it. Production uses [`GeminiClient`](crate::client::GeminiClient);
//! tests inject scripted implementations to drive failure paths.

use crate::error::InsightResult;
use async_trait::async_trait;

/// A text-in, text-out completion backend
///
/// Implementations send one prompt and return the model's raw text reply.
/// They do not parse, retry, cache, or swallow errors; all of that is the
/// caller's responsibility.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send a prompt and return the raw completion text
    async fn generate(&self, prompt: &str) -> InsightResult<String>;

    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;
}
