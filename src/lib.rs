#![allow(clippy::doc_markdown)] // Allow technical terms like TTL, Gemini in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # StockSense Insights
//!
//! Resilient AI-insights core for the StockSense medical inventory
//! platform.
//!
//! ## Overview
//!
//! The StockSense web application delegates its analytical features
//! (trend analysis, actionable insights, demand prediction, monthly
//! narratives, and free-text Q&A) to an external generative API. That
//! dependency is slow, rate limited, and occasionally down, so this crate
//! wraps it in a resilience pipeline and guarantees that every operation
//! resolves: when the generative path fails in any way, a deterministic
//! rule-based fallback computed purely from the input data is returned
//! instead.
//!
//! ## Architecture
//!
//! Four cooperating pieces behind one façade:
//!
//! - **TTL cache**: successful responses are reused for 30 minutes, so
//!   repeated dashboard loads do not re-pay for expensive completions
//! - **Serial request queue**: one upstream call in flight at a time,
//!   FIFO, with a fixed inter-request delay against burst traffic
//! - **Circuit breaker**: after repeated upstream failures the pipeline
//!   fails fast for a cooldown window instead of hammering a dead API
//! - **Backoff retry**: rate-limited calls are retried on an exponential
//!   schedule before the fallback takes over
//!
//! ## Module Organization
//!
//! - [`insights`] - Domain operations, fallbacks, and the service façade
//! - [`resilience`] - Circuit breaker, serial queue, and retry
//! - [`cache`] - TTL response cache
//! - [`client`] - Generative API trait seam and the Gemini client
//! - [`config`] - Configuration with environment loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stocksense_insights::config::InsightsConfig;
//! use stocksense_insights::insights::{InsightsService, InventoryDescriptor};
//!
//! # async fn example() {
//! let service = InsightsService::new(InsightsConfig::from_env().unwrap_or_default());
//!
//! let items = vec![InventoryDescriptor {
//!     id: "item-1".to_string(),
//!     name: "Nitrile Gloves".to_string(),
//!     current_stock: 15,
//!     min_stock_level: 10,
//!     max_stock_level: 100,
//!     reorder_point: 20,
//!     average_usage: Some(40.0),
//!     category: Some("PPE".to_string()),
//! }];
//!
//! // Never fails: degraded paths resolve with rule-based fallbacks
//! let trends = service.analyze_trends(&items).await;
//! println!("{} trends, available: {}", trends.len(), service.is_available());
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod insights;
pub mod logging;
pub mod resilience;

pub use cache::{CacheStats, TtlCache};
pub use client::{GeminiClient, GeminiConfig, GenerativeClient};
pub use config::InsightsConfig;
pub use error::{InsightError, InsightResult};
pub use insights::{
    Answer, InsightsService, InventoryContext, InventoryDescriptor, Insight, MonthlyInsight,
    MonthlySummaryInput, Prediction, Trend, TrendDirection,
};
pub use resilience::{CircuitBreaker, CircuitState, SerialRequestQueue};
