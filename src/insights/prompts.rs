//! Prompt builders for the generative API.
//!
//! Each builder embeds the serialized input and spells out the exact JSON
//! shape the reply must use, matching the serde derives in
//! [`types`](crate::insights::types). The model is told to answer with
//! JSON only; the extraction layer handles replies that wrap it anyway.

use crate::insights::types::{InventoryContext, InventoryDescriptor, MonthlySummaryInput};

fn serialize<T: serde::Serialize>(input: &T) -> String {
    serde_json::to_string(input).unwrap_or_else(|_| "null".to_string())
}

/// Prompt for per-item stock trend analysis
pub fn trend_analysis(items: &[InventoryDescriptor]) -> String {
    format!(
        "You are an inventory analyst for a medical supply warehouse. \
         Analyze the stock trend for each item below.\n\n\
         Inventory data:\n{}\n\n\
         Respond with ONLY a JSON array, one element per item, shaped as:\n\
         [{{\"itemId\": \"...\", \"itemName\": \"...\", \"trend\": \"increasing|decreasing|stable\", \
         \"confidence\": 0.0, \"recommendation\": \"...\"}}]",
        serialize(&items)
    )
}

/// Prompt for actionable inventory insights
pub fn insight_generation(items: &[InventoryDescriptor]) -> String {
    format!(
        "You are an inventory analyst for a medical supply warehouse. \
         Identify actionable insights (stockout risks, overstock, anomalies) in the items below.\n\n\
         Inventory data:\n{}\n\n\
         Respond with ONLY a JSON array shaped as:\n\
         [{{\"type\": \"warning|info|success\", \"priority\": \"high|medium|low\", \
         \"title\": \"...\", \"message\": \"...\", \"itemId\": \"...\"}}]",
        serialize(&items)
    )
}

/// Prompt for 30-day demand prediction
pub fn needs_prediction(items: &[InventoryDescriptor]) -> String {
    format!(
        "You are an inventory analyst for a medical supply warehouse. \
         Predict the units each item below will need over the next 30 days, \
         using averageUsage where present.\n\n\
         Inventory data:\n{}\n\n\
         Respond with ONLY a JSON array shaped as:\n\
         [{{\"itemId\": \"...\", \"itemName\": \"...\", \"predictedNeed\": 0, \
         \"timeframe\": \"30 days\", \"confidence\": 0.0}}]",
        serialize(&items)
    )
}

/// Prompt for the month-in-review narrative
pub fn monthly_summary(input: &MonthlySummaryInput) -> String {
    format!(
        "You are an inventory analyst for a medical supply warehouse. \
         Write a month-in-review for the aggregated movement data below. \
         Mention totals, the reject rate as a percentage with two decimals, \
         destination split, and the top product when present.\n\n\
         Monthly data:\n{}\n\n\
         Respond with ONLY a JSON object shaped as:\n\
         {{\"summary\": \"...\", \"keyFindings\": [\"...\"], \
         \"trends\": [\"...\"], \"recommendations\": [\"...\"]}}",
        serialize(input)
    )
}

/// Prompt for free-text question answering over the inventory snapshot
pub fn question(question: &str, context: &InventoryContext) -> String {
    format!(
        "You are an inventory analyst for a medical supply warehouse. \
         Answer the question using ONLY the inventory snapshot below.\n\n\
         Snapshot:\n{}\n\n\
         Question: {}\n\n\
         Respond with ONLY a JSON object shaped as:\n\
         {{\"answer\": \"...\", \"confidence\": 0.0}}",
        serialize(context),
        question
    )
}
