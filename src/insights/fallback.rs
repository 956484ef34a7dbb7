//! Deterministic rule-based fallbacks.
//!
//! Every public operation of the façade resolves to one of these when the
//! generative path is unavailable, rate limited past its retry budget, or
//! returns something unparseable. The rules use only the input data, never
//! the network, and their lower confidence scores are the caller-visible
//! signal of degraded operation.

use crate::insights::types::{
    Answer, InventoryContext, InventoryDescriptor, Insight, InsightKind, InsightPriority,
    MonthlyInsight, MonthlySummaryInput, Prediction, Trend, TrendDirection,
};

/// Stock ratio above which an item counts as trending toward capacity
const HIGH_STOCK_RATIO: f64 = 0.8;

/// Reject rate (percent) above which quality is flagged as worsening
const REJECT_RATE_WORSENING: f64 = 5.0;

/// Reject rate (percent) below which quality is flagged as improving
const REJECT_RATE_IMPROVING: f64 = 2.0;

/// Single-destination share (percent) above which rebalancing is suggested
const DESTINATION_IMBALANCE_SHARE: f64 = 80.0;

/// Threshold-based trend analysis, confidence fixed at 0.5.
pub fn trend_fallback(items: &[InventoryDescriptor]) -> Vec<Trend> {
    items
        .iter()
        .map(|item| {
            let trend = if item.current_stock < item.reorder_point {
                TrendDirection::Decreasing
            } else if item.max_stock_level > 0
                && f64::from(item.current_stock) / f64::from(item.max_stock_level)
                    > HIGH_STOCK_RATIO
            {
                TrendDirection::Increasing
            } else {
                TrendDirection::Stable
            };

            let recommendation = match trend {
                TrendDirection::Decreasing => {
                    "Stock is below the reorder point; restock soon".to_string()
                }
                TrendDirection::Increasing => {
                    "Stock is near capacity; review usage before reordering".to_string()
                }
                TrendDirection::Stable => "Stock level is within the expected range".to_string(),
            };

            Trend {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                trend,
                confidence: 0.5,
                recommendation,
            }
        })
        .collect()
}

/// Threshold-based insight generation.
///
/// Items below their reorder point raise a high-priority warning, items
/// above their maximum raise a medium-priority notice, and a quiet
/// inventory yields a single all-normal entry.
pub fn insights_fallback(items: &[InventoryDescriptor]) -> Vec<Insight> {
    let mut insights = Vec::new();

    for item in items {
        if item.current_stock < item.reorder_point {
            insights.push(Insight {
                kind: InsightKind::Warning,
                priority: InsightPriority::High,
                title: format!("Low stock: {}", item.name),
                message: format!(
                    "{} is below its reorder point ({} < {})",
                    item.name, item.current_stock, item.reorder_point
                ),
                item_id: Some(item.id.clone()),
            });
        } else if item.current_stock > item.max_stock_level {
            insights.push(Insight {
                kind: InsightKind::Info,
                priority: InsightPriority::Medium,
                title: format!("Overstock: {}", item.name),
                message: format!(
                    "{} exceeds its maximum stock level ({} > {})",
                    item.name, item.current_stock, item.max_stock_level
                ),
                item_id: Some(item.id.clone()),
            });
        }
    }

    if insights.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Success,
            priority: InsightPriority::Low,
            title: "All stock levels normal".to_string(),
            message: "No items are below their reorder point or above their maximum level"
                .to_string(),
            item_id: None,
        });
    }

    insights
}

/// Usage-projection prediction: 1.2x the monthly average (or half the
/// reorder point when no usage history exists), over a fixed 30-day
/// horizon.
pub fn prediction_fallback(items: &[InventoryDescriptor]) -> Vec<Prediction> {
    items
        .iter()
        .map(|item| {
            let base = item
                .average_usage
                .unwrap_or_else(|| f64::from(item.reorder_point) / 2.0);
            let confidence = if item.average_usage.is_some() { 0.6 } else { 0.3 };

            Prediction {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                predicted_need: (base * 1.2).round().max(0.0) as u32,
                timeframe: "30 days".to_string(),
                confidence,
            }
        })
        .collect()
}

/// Arithmetic month-in-review over the aggregated movement numbers.
pub fn monthly_fallback(input: &MonthlySummaryInput) -> MonthlyInsight {
    let reject_rate = if input.total_quantity == 0 {
        0.0
    } else {
        input.reject_count as f64 / input.total_quantity as f64 * 100.0
    };

    let summary = format!(
        "In {}, {} products moved {} units with a reject rate of {:.2}%.",
        input.month, input.total_items, input.total_quantity, reject_rate
    );

    let mut key_findings = vec![
        format!(
            "{} distinct products, {} units moved in total",
            input.total_items, input.total_quantity
        ),
        format!(
            "Reject rate: {:.2}% ({} of {} units)",
            reject_rate, input.reject_count, input.total_quantity
        ),
    ];

    let mut max_share = 0.0f64;
    if !input.destinations.is_empty() && input.total_quantity > 0 {
        let split = input
            .destinations
            .iter()
            .map(|(name, quantity)| {
                let share = *quantity as f64 / input.total_quantity as f64 * 100.0;
                max_share = max_share.max(share);
                format!("{name} {share:.1}%")
            })
            .collect::<Vec<_>>()
            .join(", ");
        key_findings.push(format!("Destination split: {split}"));
    }

    if let Some(top) = &input.top_product {
        key_findings.push(format!("Top product: {} ({} units)", top.name, top.quantity));
    }

    let mut trends = Vec::new();
    if reject_rate > REJECT_RATE_WORSENING {
        trends.push(format!(
            "Reject rate above {REJECT_RATE_WORSENING:.0}% suggests worsening quality"
        ));
    } else if reject_rate < REJECT_RATE_IMPROVING {
        trends.push(format!(
            "Reject rate below {REJECT_RATE_IMPROVING:.0}% suggests improving quality"
        ));
    }

    let mut recommendations = Vec::new();
    if reject_rate > REJECT_RATE_WORSENING {
        recommendations
            .push("Review quality control procedures for high-reject product lines".to_string());
    }
    if max_share > DESTINATION_IMBALANCE_SHARE {
        recommendations.push("Consider rebalancing shipments across destinations".to_string());
    }
    recommendations.push("Continue monitoring monthly inventory movements".to_string());

    MonthlyInsight {
        summary,
        key_findings,
        trends,
        recommendations,
    }
}

/// Keyword-routed question answering over the inventory snapshot.
///
/// Categories are matched in priority order; the first hit wins. Matched
/// answers carry confidence 0.4, the generic reply 0.1.
pub fn answer_fallback(question: &str, context: &InventoryContext) -> Answer {
    let q = question.to_lowercase();

    if q.contains("total") || q.contains("how many") {
        return Answer {
            answer: format!("The inventory currently tracks {} items.", context.total_items),
            confidence: 0.4,
        };
    }

    if q.contains("low stock") || q.contains("reorder") {
        let answer = if context.low_stock_items.is_empty() {
            "No items are currently at or below their reorder point.".to_string()
        } else {
            format!(
                "{} items need reordering: {}.",
                context.low_stock_items.len(),
                context.low_stock_items.join(", ")
            )
        };
        return Answer {
            answer,
            confidence: 0.4,
        };
    }

    if q.contains("recent") || q.contains("activity") {
        let answer = if context.recent_activity.is_empty() {
            "No recent inventory activity recorded.".to_string()
        } else {
            format!("Recent activity: {}.", context.recent_activity.join("; "))
        };
        return Answer {
            answer,
            confidence: 0.4,
        };
    }

    if q.contains("category") || q.contains("categories") {
        let answer = if context.categories.is_empty() {
            "No category information available.".to_string()
        } else {
            let breakdown = context
                .categories
                .iter()
                .map(|(name, count)| format!("{name} ({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Items by category: {breakdown}.")
        };
        return Answer {
            answer,
            confidence: 0.4,
        };
    }

    Answer {
        answer: "I cannot process that question right now. Try asking about totals, low stock, \
                 recent activity, or categories."
            .to_string(),
        confidence: 0.1,
    }
}
