//! Domain types for the insights operations.
//!
//! Field names serialize as camelCase because the prompts ask the model
//! for exactly these shapes; the same derives parse the model's reply and
//! feed the response cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single inventory item as the web application describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDescriptor {
    pub id: String,
    pub name: String,
    pub current_stock: u32,
    pub min_stock_level: u32,
    pub max_stock_level: u32,
    pub reorder_point: u32,
    /// Average units consumed per month, when usage history exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Direction of a stock-level trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Per-item trend analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub item_id: String,
    pub item_name: String,
    pub trend: TrendDirection,
    pub confidence: f64,
    pub recommendation: String,
}

/// Insight severity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Info,
    Success,
}

/// Insight priority band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

/// A single actionable observation about the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub priority: InsightPriority,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

/// Per-item forward demand estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub item_id: String,
    pub item_name: String,
    pub predicted_need: u32,
    pub timeframe: String,
    pub confidence: f64,
}

/// Highest-volume product within a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    pub quantity: u64,
}

/// Aggregated movement numbers for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryInput {
    /// Month label as the application renders it (e.g., "March 2026")
    pub month: String,
    pub total_items: u64,
    pub total_quantity: u64,
    pub reject_count: u64,
    /// Units shipped per destination
    #[serde(default)]
    pub destinations: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_product: Option<TopProduct>,
}

/// Narrative month-in-review produced by analysis or fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyInsight {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Inventory snapshot supplied alongside free-text questions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryContext {
    pub total_items: u64,
    #[serde(default)]
    pub low_stock_items: Vec<String>,
    #[serde(default)]
    pub recent_activity: Vec<String>,
    /// Item counts per category
    #[serde(default)]
    pub categories: BTreeMap<String, u64>,
}

/// Reply to a free-text inventory question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub confidence: f64,
}
