//! Normalization of raw vendor order exports ahead of metric aggregation.
//!
//! Enrichment runs in a fixed sequence: denylisted SKUs out first, then
//! variation parsing, then cancelled orders out, then quantity coercion and
//! the derived `Total Items` column. Each function returns a new frame.

use super::{
    CANCELLATION_COLUMN, QUANTITY_COLUMN, SELLER_SKU_COLUMN, TOTAL_ITEMS_COLUMN, VARIATION_COLUMN,
};
use crate::error::Result;
use crate::utils::{int_cells, int_or_zero, required_column, string_cells, variation_code};
use polars::prelude::*;
use tracing::{debug, info};

/// Drop rows whose `Seller SKU` contains any denylist entry.
///
/// Matching is case-insensitive substring matching, OR-combined across the
/// denylist. Denylisted codes are promotional or sample SKUs, not real
/// variation units, so the whole row leaves the analysis. Null SKUs never
/// match and are retained. An empty denylist disables the exclusion.
pub fn exclude_denylisted_skus(df: &DataFrame, denylist: &[String]) -> Result<DataFrame> {
    if denylist.is_empty() || df.height() == 0 {
        return Ok(df.clone());
    }

    let sku = required_column(df, SELLER_SKU_COLUMN)?;
    let cells = string_cells(sku.as_materialized_series())?;
    let needles: Vec<String> = denylist.iter().map(|s| s.to_lowercase()).collect();

    let keep: Vec<bool> = cells
        .iter()
        .map(|cell| match cell {
            Some(text) => {
                let lower = text.to_lowercase();
                !needles.iter().any(|needle| lower.contains(needle))
            }
            None => true,
        })
        .collect();

    let mask = BooleanChunked::from_slice("sku_denylist".into(), &keep);
    let kept = df.filter(&mask)?;
    debug!(
        "Excluded {} denylisted SKU rows",
        df.height() - kept.height()
    );
    Ok(kept)
}

/// Replace `Variation` text with its numeric code.
///
/// The code is the first digit run in the cell ("30ml" becomes 30); cells
/// without digits, including nulls, become 0 so every row participates in
/// arithmetic.
pub fn derive_variation_codes(df: &DataFrame) -> Result<DataFrame> {
    let variation = required_column(df, VARIATION_COLUMN)?;
    let cells = string_cells(variation.as_materialized_series())?;

    let codes: Vec<i64> = cells
        .iter()
        .map(|cell| cell.as_deref().map(variation_code).unwrap_or(0))
        .collect();

    let mut result = df.clone();
    result.replace(VARIATION_COLUMN, Series::new(VARIATION_COLUMN.into(), codes))?;
    Ok(result)
}

/// Drop rows marked as cancelled.
///
/// A row is cancelled when its `Cancelation/Return Type` cell contains
/// "cancel" in any casing. Null cells and a missing column both mean "not
/// cancelled": plenty of exports omit the column entirely.
pub fn exclude_cancelled_orders(df: &DataFrame) -> Result<DataFrame> {
    let Ok(column) = df.column(CANCELLATION_COLUMN) else {
        debug!(
            "No '{}' column present; keeping all rows",
            CANCELLATION_COLUMN
        );
        return Ok(df.clone());
    };

    let cells = string_cells(column.as_materialized_series())?;
    let keep: Vec<bool> = cells
        .iter()
        .map(|cell| match cell {
            Some(text) => !text.to_lowercase().contains("cancel"),
            None => true,
        })
        .collect();

    let mask = BooleanChunked::from_slice("cancelled".into(), &keep);
    let kept = df.filter(&mask)?;
    debug!("Excluded {} cancelled rows", df.height() - kept.height());
    Ok(kept)
}

/// Coerce `Quantity` to integers and add the derived `Total Items` column.
///
/// Quantity cells that fail coercion become 0 rather than an error; the
/// derived value is `Variation * Quantity` per row. Expects `Variation` to
/// already hold numeric codes (see [`derive_variation_codes`]); non-numeric
/// leftovers count as 0.
pub fn derive_total_items(df: &DataFrame) -> Result<DataFrame> {
    let variation_column = required_column(df, VARIATION_COLUMN)?;
    let variations: Vec<i64> = int_cells(variation_column.as_materialized_series())?
        .iter()
        .map(|cell| cell.unwrap_or(0))
        .collect();

    let quantity_cells =
        string_cells(required_column(df, QUANTITY_COLUMN)?.as_materialized_series())?;
    let quantities: Vec<i64> = quantity_cells
        .iter()
        .map(|cell| cell.as_deref().map(int_or_zero).unwrap_or(0))
        .collect();

    let totals: Vec<i64> = variations
        .iter()
        .zip(&quantities)
        .map(|(variation, quantity)| variation.saturating_mul(*quantity))
        .collect();

    let mut result = df.clone();
    result.replace(
        QUANTITY_COLUMN,
        Series::new(QUANTITY_COLUMN.into(), quantities),
    )?;
    result.with_column(Series::new(TOTAL_ITEMS_COLUMN.into(), totals))?;
    Ok(result)
}

/// Full enrichment sequence over a cleaned order frame.
pub fn enrich_orders(df: &DataFrame, denylist: &[String]) -> Result<DataFrame> {
    let enriched = exclude_denylisted_skus(df, denylist)?;
    let enriched = derive_variation_codes(&enriched)?;
    let enriched = exclude_cancelled_orders(&enriched)?;
    let enriched = derive_total_items(&enriched)?;

    info!(
        "Enriched orders: {} of {} rows remain",
        enriched.height(),
        df.height()
    );
    Ok(enriched)
}
