//! Shared data structures for cleaning summaries and analytics reports.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order volume for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Month in `YYYY-MM` form. Lexicographic order is chronological order.
    pub month: String,
    /// Number of orders created in that month.
    pub orders: usize,
}

/// Aggregated sales for one variation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationTotals {
    /// The variation code (e.g. 7 for a 7-day pack).
    pub variation: i64,
    /// Sum of `Total Items` across orders with this variation.
    pub total_items: i64,
    /// Equivalent order count: `total_items / variation`.
    pub total_orders: f64,
}

/// Aggregated sales for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTotals {
    pub state: String,
    /// Sum of `Total Items` across orders shipped to this state.
    pub total_items: i64,
}

/// Headline numbers for an order dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Number of order rows after enrichment.
    pub total_orders: usize,
    /// Sum of the `Total Items` column.
    pub total_items_sold: i64,
    /// Distinct buyer usernames.
    pub unique_customers: usize,
    /// Buyers with more than one order.
    pub repeat_customers: usize,
}

/// Full analytics report over an enriched order dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReport {
    pub summary: OrderSummary,
    /// Purchase counts for buyers with more than one order.
    pub repeat_customers: HashMap<String, usize>,
    /// Orders per month, chronologically sorted.
    pub monthly_trend: Vec<MonthlyCount>,
    /// Totals for each allowed variation code, ascending by code.
    pub totals_by_variation: Vec<VariationTotals>,
    /// Totals per state, descending by items sold.
    pub totals_by_state: Vec<StateTotals>,
    /// Most frequent state, or "no data" when the dataset is empty.
    pub top_state: String,
}

/// Shape changes and step log from a cleaning run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Human-readable description of each applied step, in application order.
    pub steps_applied: Vec<String>,
}

impl CleaningSummary {
    /// Number of rows removed by the run.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Number of columns removed by the run.
    pub fn columns_removed(&self) -> usize {
        self.columns_before.saturating_sub(self.columns_after)
    }
}
