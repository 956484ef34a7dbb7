//! # Inventory Insights
//!
//! The domain layer: operation types, prompt construction, canonical
//! cache keys, deterministic fallbacks, and the [`InsightsService`]
//! façade that composes them with the resilience pipeline.

pub mod cache_key;
pub mod fallback;
pub mod prompts;
pub mod service;
pub mod types;

pub use cache_key::cache_key;
pub use service::InsightsService;
pub use types::{
    Answer, InventoryContext, InventoryDescriptor, Insight, InsightKind, InsightPriority,
    MonthlyInsight, MonthlySummaryInput, Prediction, TopProduct, Trend, TrendDirection,
};
