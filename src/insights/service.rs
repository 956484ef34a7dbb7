//! # Insights Service Façade
//!
//! The single public surface of the crate: five inventory-analysis
//! operations backed by the generative API, made resilient by the cache,
//! serial queue, circuit breaker, and retry layers, and guaranteed to
//! resolve with deterministic fallback data on every failure path.
//!
//! ## Pipeline
//!
//! ```text
//! operation -> cache lookup -> serial queue -> circuit breaker
//!           -> backoff retry -> Gemini API -> JSON extraction
//!           -> cache store (30 min) -> typed result
//!                     \(any failure)-> rule-based fallback
//! ```
//!
//! The façade owns all pipeline state; one instance per process is the
//! intended deployment, either injected at wiring time or obtained from
//! [`InsightsService::global`].

use crate::cache::{CacheStats, TtlCache};
use crate::client::{extract_json, GeminiClient, GeminiConfig, GenerativeClient};
use crate::config::InsightsConfig;
use crate::error::{InsightError, InsightResult};
use crate::insights::cache_key::cache_key;
use crate::insights::fallback;
use crate::insights::prompts;
use crate::insights::types::{
    Answer, InventoryContext, InventoryDescriptor, Insight, MonthlyInsight, MonthlySummaryInput,
    Prediction, Trend,
};
use crate::resilience::{retry_with_backoff, CircuitBreaker, CircuitState, SerialRequestQueue};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

static GLOBAL_SERVICE: OnceLock<InsightsService> = OnceLock::new();

/// Resilient façade over the generative inventory-analysis operations
pub struct InsightsService {
    config: InsightsConfig,
    client: Option<Arc<dyn GenerativeClient>>,
    cache: TtlCache,
    breaker: Arc<CircuitBreaker>,
    queue: SerialRequestQueue,
}

impl std::fmt::Debug for InsightsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightsService")
            .field("backend", &self.client.as_ref().map(|c| c.backend_name()))
            .field("circuit_state", &self.breaker.state())
            .field("cache", &self.cache)
            .finish()
    }
}

impl InsightsService {
    /// Build a service from configuration.
    ///
    /// A missing credential or an unconstructible HTTP client degrades to
    /// fallback-only mode; construction itself never fails.
    pub fn new(config: InsightsConfig) -> Self {
        let client: Option<Arc<dyn GenerativeClient>> = match &config.api_key {
            Some(api_key) => {
                let gemini = GeminiClient::new(GeminiConfig {
                    base_url: config.base_url.clone(),
                    model: config.model.clone(),
                    api_key: api_key.clone(),
                    timeout_ms: config.request_timeout_ms,
                });
                match gemini {
                    Ok(client) => Some(Arc::new(client)),
                    Err(error) => {
                        warn!(
                            error = %error,
                            "Generative client construction failed; running in fallback-only mode"
                        );
                        None
                    }
                }
            }
            None => {
                info!("🔌 No generative API credential configured; running in fallback-only mode");
                None
            }
        };

        Self::assemble(config, client)
    }

    /// Build a service around an injected client (the test seam).
    pub fn with_client(config: InsightsConfig, client: Arc<dyn GenerativeClient>) -> Self {
        Self::assemble(config, Some(client))
    }

    fn assemble(config: InsightsConfig, client: Option<Arc<dyn GenerativeClient>>) -> Self {
        let cache = TtlCache::new(config.cache.default_ttl);
        let breaker = Arc::new(CircuitBreaker::new(
            "generative_api",
            config.circuit_breaker.clone(),
        ));
        let queue = SerialRequestQueue::new(config.queue.inter_task_delay);

        info!(
            backend = client.as_ref().map(|c| c.backend_name()).unwrap_or("none"),
            model = %config.model,
            "💡 Insights service initialized"
        );

        Self {
            config,
            client,
            cache,
            breaker,
            queue,
        }
    }

    /// Process-wide instance, lazily built from the environment.
    ///
    /// Initialization happens exactly once; a malformed environment logs a
    /// warning and falls back to default (fallback-only) configuration so
    /// the accessor itself cannot fail.
    pub fn global() -> &'static InsightsService {
        GLOBAL_SERVICE.get_or_init(|| {
            let config = InsightsConfig::from_env().unwrap_or_else(|error| {
                warn!(error = %error, "Invalid insights environment; using defaults");
                InsightsConfig::default()
            });
            Self::new(config)
        })
    }

    // Public operations. None of these ever returns an error: every
    // failure path resolves with the matching deterministic fallback.

    /// Analyze the stock trend of each item.
    pub async fn analyze_trends(&self, items: &[InventoryDescriptor]) -> Vec<Trend> {
        let key_params = json!({
            "items": items
                .iter()
                .map(|item| json!({"id": item.id, "currentStock": item.current_stock}))
                .collect::<Vec<_>>(),
        });

        self.run_operation(
            "analyze_trends",
            key_params,
            prompts::trend_analysis(items),
            || fallback::trend_fallback(items),
        )
        .await
    }

    /// Generate actionable insights over the inventory.
    pub async fn generate_insights(&self, items: &[InventoryDescriptor]) -> Vec<Insight> {
        let key_params = json!({
            "items": items
                .iter()
                .map(|item| json!({"id": item.id, "currentStock": item.current_stock}))
                .collect::<Vec<_>>(),
        });

        self.run_operation(
            "generate_insights",
            key_params,
            prompts::insight_generation(items),
            || fallback::insights_fallback(items),
        )
        .await
    }

    /// Predict 30-day demand for each item.
    pub async fn predict_needs(&self, items: &[InventoryDescriptor]) -> Vec<Prediction> {
        let key_params = json!({
            "items": items
                .iter()
                .map(|item| json!({
                    "id": item.id,
                    "averageUsage": item.average_usage,
                    "reorderPoint": item.reorder_point,
                }))
                .collect::<Vec<_>>(),
        });

        self.run_operation(
            "predict_needs",
            key_params,
            prompts::needs_prediction(items),
            || fallback::prediction_fallback(items),
        )
        .await
    }

    /// Produce a narrative month-in-review.
    pub async fn summarize_month(&self, input: &MonthlySummaryInput) -> MonthlyInsight {
        let key_params = json!({
            "month": input.month,
            "totalQuantity": input.total_quantity,
            "rejectCount": input.reject_count,
        });

        self.run_operation(
            "summarize_month",
            key_params,
            prompts::monthly_summary(input),
            || fallback::monthly_fallback(input),
        )
        .await
    }

    /// Answer a free-text question about the inventory snapshot.
    pub async fn answer_question(&self, question: &str, context: &InventoryContext) -> Answer {
        let key_params = json!({
            "question": question,
            "totalItems": context.total_items,
            "lowStockItems": context.low_stock_items,
        });

        self.run_operation(
            "answer_question",
            key_params,
            prompts::question(question, context),
            || fallback::answer_fallback(question, context),
        )
        .await
    }

    // Introspection

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Live cache size and keys (sweeps expired entries first).
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Current breaker state.
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Whether the generative path is currently usable: a client was
    /// constructed and the circuit is not open.
    pub fn is_available(&self) -> bool {
        self.client.is_some() && self.breaker.state() != CircuitState::Open
    }

    // Pipeline internals

    /// Run one operation through cache, pipeline, and fallback.
    async fn run_operation<T, F>(
        &self,
        operation: &'static str,
        key_params: Value,
        prompt: String,
        fallback: F,
    ) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let key = cache_key(operation, &key_params);

        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<T>(cached) {
                Ok(value) => return value,
                Err(error) => {
                    // A shape mismatch means the entry predates a type
                    // change; treat it as a miss
                    debug!(operation, error = %error, "Discarding undeserializable cache entry");
                }
            }
        }

        let outcome = match self.call_model(prompt).await {
            Ok(raw) => Self::parse_reply::<T>(&raw),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(value) => {
                if let Ok(serialized) = serde_json::to_value(&value) {
                    self.cache
                        .set(&key, serialized, Some(self.config.cache.response_ttl));
                }
                value
            }
            Err(error) => {
                let metrics = self.breaker.metrics().await;
                warn!(
                    operation,
                    error = %error,
                    circuit_state = %self.breaker.state(),
                    consecutive_failures = metrics.consecutive_failures,
                    timestamp = %Utc::now().to_rfc3339(),
                    "📉 Generative path failed; using offline analysis"
                );
                fallback()
            }
        }
    }

    /// Dispatch one prompt through queue -> breaker -> retry -> client.
    async fn call_model(&self, prompt: String) -> InsightResult<String> {
        let client = self.client.clone().ok_or_else(|| {
            InsightError::Unavailable("no generative API credential configured".to_string())
        })?;
        let breaker = Arc::clone(&self.breaker);
        let retry = self.config.retry.clone();

        self.queue
            .enqueue(async move {
                breaker
                    .call(|| async {
                        retry_with_backoff(&retry, || {
                            let client = Arc::clone(&client);
                            let prompt = prompt.clone();
                            async move { client.generate(&prompt).await }
                        })
                        .await
                    })
                    .await
            })
            .await
    }

    /// Extract the reply's JSON payload and deserialize it.
    ///
    /// Runs after the breaker call returns, so an unparseable reply does
    /// not count as an upstream failure.
    fn parse_reply<T: DeserializeOwned>(raw: &str) -> InsightResult<T> {
        let value = extract_json(raw)?;
        Ok(serde_json::from_value(value)?)
    }
}
