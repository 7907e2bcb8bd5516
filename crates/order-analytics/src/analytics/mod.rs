//! Order enrichment and sales metrics.
//!
//! Enrichment normalizes raw vendor order exports (SKU denylist, variation
//! codes, cancellations, quantity coercion, derived totals); metrics
//! aggregate the enriched frame into customer, trend, variation and state
//! views. [`OrderAnalyzer::build_report`] composes both into one report.

mod enrichment;
mod metrics;

pub use enrichment::{
    derive_total_items, derive_variation_codes, enrich_orders, exclude_cancelled_orders,
    exclude_denylisted_skus,
};
pub use metrics::{
    NO_DATA, TIMESTAMP_FORMAT, monthly_purchase_trend, purchase_frequency, repeat_customers,
    summarize_orders, top_state, totals_by_state, totals_by_variation,
};

use crate::config::AnalyticsConfig;
use crate::error::{Result, ResultExt};
use crate::types::OrderReport;
use polars::prelude::*;
use tracing::info;

/// Buyer identifier column in vendor order exports.
pub const BUYER_COLUMN: &str = "Buyer Username";
/// Order creation timestamp column.
pub const CREATED_TIME_COLUMN: &str = "Created Time";
/// Seller SKU column checked against the denylist.
pub const SELLER_SKU_COLUMN: &str = "Seller SKU";
/// Variation text column, normalized to a numeric code.
pub const VARIATION_COLUMN: &str = "Variation";
/// Order quantity column, coerced to integers.
pub const QUANTITY_COLUMN: &str = "Quantity";
/// Shipping state column.
pub const STATE_COLUMN: &str = "State";
/// Cancellation marker column. The single-l spelling matches the vendor
/// export header.
pub const CANCELLATION_COLUMN: &str = "Cancelation/Return Type";
/// Derived column holding variation times quantity.
pub const TOTAL_ITEMS_COLUMN: &str = "Total Items";

/// Runs enrichment plus every metric over a cleaned order dataset.
pub struct OrderAnalyzer;

static_assertions::assert_impl_all!(OrderAnalyzer: Send, Sync);

impl OrderAnalyzer {
    /// Enrich `df` and compute the full report.
    ///
    /// Expects a cleaned frame with the vendor order columns; see the column
    /// constants in this module. Fails on missing required columns and on
    /// malformed creation timestamps.
    pub fn build_report(&self, df: &DataFrame, config: &AnalyticsConfig) -> Result<OrderReport> {
        let enriched = enrich_orders(df, &config.sku_denylist)?;

        let summary = summarize_orders(&enriched).context("While summarizing orders")?;
        let repeat = repeat_customers(&enriched).context("While counting repeat customers")?;
        let monthly_trend = monthly_purchase_trend(&enriched)
            .context("While computing monthly purchase trend")?;
        let totals_by_variation = totals_by_variation(&enriched, &config.allowed_variations)
            .context("While totaling variations")?;
        let totals_by_state =
            totals_by_state(&enriched).context("While totaling state sales")?;
        let top_state = top_state(&enriched).context("While finding the top state")?;

        info!(
            "Report built: {} orders, {} repeat customers, {} months",
            summary.total_orders,
            repeat.len(),
            monthly_trend.len()
        );

        Ok(OrderReport {
            summary,
            repeat_customers: repeat,
            monthly_trend,
            totals_by_variation,
            totals_by_state,
            top_state,
        })
    }
}
