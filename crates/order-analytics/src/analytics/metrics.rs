//! Sales metrics over enriched order frames.

use super::{BUYER_COLUMN, CREATED_TIME_COLUMN, STATE_COLUMN, TOTAL_ITEMS_COLUMN, VARIATION_COLUMN};
use crate::error::{AnalyticsError, Result};
use crate::types::{MonthlyCount, OrderSummary, StateTotals, VariationTotals};
use crate::utils::{int_cells, required_column, string_cells, string_mode};
use chrono::{Datelike, NaiveDateTime};
use polars::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Placeholder top state for datasets with no usable state values.
pub const NO_DATA: &str = "no data";

/// Day-first creation timestamp format used by vendor exports.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Purchase counts for buyers with more than one order.
///
/// Iteration order of the returned map is unspecified; sort before
/// displaying.
pub fn repeat_customers(df: &DataFrame) -> Result<HashMap<String, usize>> {
    let buyers = string_cells(required_column(df, BUYER_COLUMN)?.as_materialized_series())?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for buyer in buyers.into_iter().flatten() {
        *counts.entry(buyer).or_insert(0) += 1;
    }
    counts.retain(|_, count| *count > 1);

    debug!("Found {} repeat customers", counts.len());
    Ok(counts)
}

/// Per-buyer purchase counts restricted to known repeat customers.
///
/// Recounts rows rather than copying `repeat`, so the result doubles as a
/// consistency check: it must equal [`repeat_customers`] for the same frame.
pub fn purchase_frequency(
    df: &DataFrame,
    repeat: &HashMap<String, usize>,
) -> Result<HashMap<String, usize>> {
    let buyers = string_cells(required_column(df, BUYER_COLUMN)?.as_materialized_series())?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for buyer in buyers.into_iter().flatten() {
        if repeat.contains_key(&buyer) {
            *counts.entry(buyer).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Orders per calendar month, chronologically ascending.
///
/// Creation timestamps must match [`TIMESTAMP_FORMAT`]; one malformed cell
/// fails the whole aggregation, because a silently skipped row would
/// misrepresent the trend. Null timestamps are skipped: they carry no month
/// to miscount.
pub fn monthly_purchase_trend(df: &DataFrame) -> Result<Vec<MonthlyCount>> {
    let cells = string_cells(required_column(df, CREATED_TIME_COLUMN)?.as_materialized_series())?;

    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for (row, cell) in cells.iter().enumerate() {
        let Some(raw) = cell else {
            continue;
        };
        let parsed = NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|_| {
            AnalyticsError::MalformedTimestamp {
                column: CREATED_TIME_COLUMN.to_string(),
                row,
                value: raw.clone(),
            }
        })?;
        *counts.entry((parsed.year(), parsed.month())).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((year, month), orders)| MonthlyCount {
            month: format!("{:04}-{:02}", year, month),
            orders,
        })
        .collect())
}

/// Items and derived order counts per allowed variation code, ascending.
///
/// Rows whose variation is outside `allowed` simply do not appear. The
/// derived order count is `total_items / variation` as a float: a 30-pack
/// sold once is one order, 30 items. Codes in `allowed` must be positive
/// (enforced by config validation).
pub fn totals_by_variation(df: &DataFrame, allowed: &[i64]) -> Result<Vec<VariationTotals>> {
    let variations = int_cells(required_column(df, VARIATION_COLUMN)?.as_materialized_series())?;
    let items = int_cells(required_column(df, TOTAL_ITEMS_COLUMN)?.as_materialized_series())?;

    let mut sums: BTreeMap<i64, i64> = BTreeMap::new();
    for (variation, item) in variations.iter().zip(&items) {
        if let (Some(variation), Some(item)) = (variation, item)
            && allowed.contains(variation)
        {
            *sums.entry(*variation).or_insert(0) += item;
        }
    }

    Ok(sums
        .into_iter()
        .map(|(variation, total_items)| VariationTotals {
            variation,
            total_items,
            total_orders: total_items as f64 / variation as f64,
        })
        .collect())
}

/// Items sold per state, descending by volume.
///
/// Ties break alphabetically so repeated runs render identically. Rows with
/// a null state are skipped.
pub fn totals_by_state(df: &DataFrame) -> Result<Vec<StateTotals>> {
    let states = string_cells(required_column(df, STATE_COLUMN)?.as_materialized_series())?;
    let items = int_cells(required_column(df, TOTAL_ITEMS_COLUMN)?.as_materialized_series())?;

    let mut sums: HashMap<String, i64> = HashMap::new();
    for (state, item) in states.iter().zip(&items) {
        if let (Some(state), Some(item)) = (state, item) {
            *sums.entry(state.clone()).or_insert(0) += item;
        }
    }

    let mut totals: Vec<StateTotals> = sums
        .into_iter()
        .map(|(state, total_items)| StateTotals { state, total_items })
        .collect();
    totals.sort_by(|a, b| {
        b.total_items
            .cmp(&a.total_items)
            .then_with(|| a.state.cmp(&b.state))
    });
    Ok(totals)
}

/// Most frequent state by row count, or [`NO_DATA`] when none exists.
///
/// Frequency counts rows, not items: the state that orders most often wins
/// even if another state buys bigger packs.
pub fn top_state(df: &DataFrame) -> Result<String> {
    let state = required_column(df, STATE_COLUMN)?;
    Ok(string_mode(state.as_materialized_series())?.unwrap_or_else(|| NO_DATA.to_string()))
}

/// Headline totals over an enriched frame.
pub fn summarize_orders(df: &DataFrame) -> Result<OrderSummary> {
    let buyers = string_cells(required_column(df, BUYER_COLUMN)?.as_materialized_series())?;
    let items = int_cells(required_column(df, TOTAL_ITEMS_COLUMN)?.as_materialized_series())?;

    let total_items_sold: i64 = items.iter().flatten().sum();
    let unique: HashSet<&String> = buyers.iter().flatten().collect();

    let mut counts: HashMap<&String, usize> = HashMap::new();
    for buyer in buyers.iter().flatten() {
        *counts.entry(buyer).or_insert(0) += 1;
    }
    let repeat_customers = counts.values().filter(|count| **count > 1).count();

    Ok(OrderSummary {
        total_orders: df.height(),
        total_items_sold,
        unique_customers: unique.len(),
        repeat_customers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyers_df() -> DataFrame {
        df!["Buyer Username" => ["A", "A", "B", "C", "C"]].unwrap()
    }

    // ========================================================================
    // repeat_customers() / purchase_frequency() tests
    // ========================================================================

    #[test]
    fn test_repeat_customers_counts() {
        let repeat = repeat_customers(&buyers_df()).unwrap();
        assert_eq!(repeat.len(), 2);
        assert_eq!(repeat.get("A"), Some(&2));
        assert_eq!(repeat.get("C"), Some(&2));
        assert_eq!(repeat.get("B"), None);
    }

    #[test]
    fn test_repeat_customers_never_single_buyers() {
        let repeat = repeat_customers(&buyers_df()).unwrap();
        assert!(repeat.values().all(|count| *count > 1));
    }

    #[test]
    fn test_repeat_customers_empty_frame() {
        let df = df!["Buyer Username" => Vec::<String>::new()].unwrap();
        assert!(repeat_customers(&df).unwrap().is_empty());
    }

    #[test]
    fn test_repeat_customers_skips_nulls() {
        let df = df!["Buyer Username" => [Some("A"), None, Some("A"), None]].unwrap();
        let repeat = repeat_customers(&df).unwrap();
        assert_eq!(repeat.len(), 1);
        assert_eq!(repeat.get("A"), Some(&2));
    }

    #[test]
    fn test_purchase_frequency_equals_repeat_customers() {
        let df = buyers_df();
        let repeat = repeat_customers(&df).unwrap();
        let frequency = purchase_frequency(&df, &repeat).unwrap();
        assert_eq!(frequency, repeat);
    }

    #[test]
    fn test_purchase_frequency_excludes_single_buyers() {
        let df = buyers_df();
        let repeat = repeat_customers(&df).unwrap();
        let frequency = purchase_frequency(&df, &repeat).unwrap();
        assert_eq!(frequency.get("B"), None);
    }

    // ========================================================================
    // monthly_purchase_trend() tests
    // ========================================================================

    #[test]
    fn test_monthly_trend_counts_and_order() {
        let df = df![
            "Created Time" => [
                "14/02/2024 16:45:00",
                "05/01/2024 10:00:00",
                "20/01/2024 11:30:00",
                "25/12/2023 23:59:59",
            ],
        ]
        .unwrap();
        let trend = monthly_purchase_trend(&df).unwrap();

        let months: Vec<(&str, usize)> = trend
            .iter()
            .map(|m| (m.month.as_str(), m.orders))
            .collect();
        assert_eq!(
            months,
            vec![("2023-12", 1), ("2024-01", 2), ("2024-02", 1)]
        );
    }

    #[test]
    fn test_monthly_trend_is_day_first() {
        // 05/01 is the 5th of January, not the 1st of May
        let df = df!["Created Time" => ["05/01/2024 10:00:00"]].unwrap();
        let trend = monthly_purchase_trend(&df).unwrap();
        assert_eq!(trend[0].month, "2024-01");
    }

    #[test]
    fn test_monthly_trend_malformed_is_fatal() {
        let df = df![
            "Created Time" => ["05/01/2024 10:00:00", "2024-01-05 10:00:00"],
        ]
        .unwrap();
        let err = monthly_purchase_trend(&df).unwrap_err();
        match err {
            AnalyticsError::MalformedTimestamp { column, row, value } => {
                assert_eq!(column, "Created Time");
                assert_eq!(row, 1);
                assert_eq!(value, "2024-01-05 10:00:00");
            }
            other => panic!("expected MalformedTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_monthly_trend_skips_null_timestamps() {
        let df = df!["Created Time" => [Some("05/01/2024 10:00:00"), None]].unwrap();
        let trend = monthly_purchase_trend(&df).unwrap();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].orders, 1);
    }

    #[test]
    fn test_monthly_trend_empty_frame() {
        let df = df!["Created Time" => Vec::<String>::new()].unwrap();
        assert!(monthly_purchase_trend(&df).unwrap().is_empty());
    }

    // ========================================================================
    // totals_by_variation() tests
    // ========================================================================

    #[test]
    fn test_totals_by_variation_restricted_to_allowed() {
        let df = df![
            "Variation" => [1i64, 1, 7, 99],
            "Total Items" => [2i64, 3, 14, 5],
        ]
        .unwrap();
        let totals = totals_by_variation(&df, &[1, 7, 15, 30]).unwrap();

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].variation, 1);
        assert_eq!(totals[0].total_items, 5);
        assert_eq!(totals[0].total_orders, 5.0);
        assert_eq!(totals[1].variation, 7);
        assert_eq!(totals[1].total_items, 14);
        assert_eq!(totals[1].total_orders, 2.0);
    }

    #[test]
    fn test_totals_by_variation_fractional_orders() {
        let df = df![
            "Variation" => [30i64],
            "Total Items" => [45i64],
        ]
        .unwrap();
        let totals = totals_by_variation(&df, &[30]).unwrap();
        assert_eq!(totals[0].total_orders, 1.5);
    }

    #[test]
    fn test_totals_by_variation_empty_allowed_set() {
        let df = df![
            "Variation" => [1i64],
            "Total Items" => [2i64],
        ]
        .unwrap();
        assert!(totals_by_variation(&df, &[]).unwrap().is_empty());
    }

    // ========================================================================
    // totals_by_state() / top_state() tests
    // ========================================================================

    #[test]
    fn test_totals_by_state_descending() {
        let df = df![
            "State" => ["Texas", "California", "Texas", "Nevada"],
            "Total Items" => [5i64, 30, 2, 30],
        ]
        .unwrap();
        let totals = totals_by_state(&df).unwrap();

        let ranked: Vec<(&str, i64)> = totals
            .iter()
            .map(|t| (t.state.as_str(), t.total_items))
            .collect();
        // California and Nevada tie on 30; alphabetical order breaks it
        assert_eq!(
            ranked,
            vec![("California", 30), ("Nevada", 30), ("Texas", 7)]
        );
    }

    #[test]
    fn test_totals_by_state_skips_null_states() {
        let df = df![
            "State" => [Some("Texas"), None],
            "Total Items" => [5i64, 100],
        ]
        .unwrap();
        let totals = totals_by_state(&df).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_items, 5);
    }

    #[test]
    fn test_top_state_is_row_mode() {
        // Texas appears most often even though California buys more items
        let df = df![
            "State" => ["Texas", "Texas", "California"],
            "Total Items" => [1i64, 1, 60],
        ]
        .unwrap();
        assert_eq!(top_state(&df).unwrap(), "Texas");
    }

    #[test]
    fn test_top_state_no_data() {
        let df = df!["State" => Vec::<String>::new()].unwrap();
        assert_eq!(top_state(&df).unwrap(), NO_DATA);

        let all_null = df!["State" => [None::<&str>, None]].unwrap();
        assert_eq!(top_state(&all_null).unwrap(), NO_DATA);
    }

    // ========================================================================
    // summarize_orders() tests
    // ========================================================================

    #[test]
    fn test_summarize_orders() {
        let df = df![
            "Buyer Username" => ["A", "A", "B"],
            "Total Items" => [30i64, 7, 3],
        ]
        .unwrap();
        let summary = summarize_orders(&df).unwrap();

        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_items_sold, 40);
        assert_eq!(summary.unique_customers, 2);
        assert_eq!(summary.repeat_customers, 1);
    }

    #[test]
    fn test_summarize_orders_empty_frame() {
        let df = df![
            "Buyer Username" => Vec::<String>::new(),
            "Total Items" => Vec::<i64>::new(),
        ]
        .unwrap();
        let summary = summarize_orders(&df).unwrap();
        assert_eq!(summary, OrderSummary::default());
    }
}
