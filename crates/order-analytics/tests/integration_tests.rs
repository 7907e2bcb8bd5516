//! Integration tests for the order analytics pipeline.
//!
//! These tests verify end-to-end behavior against vendor-shaped CSV fixtures:
//! an order export with banner and totals rows, and a settlement export whose
//! order IDs carry a text prefix.

use order_analytics::utils::{int_cells, string_cells};
use order_analytics::{
    AnalyticsConfig, AnalyticsError, DataCleaner, OrderAnalyzer, enrich_orders, load_csv,
    load_csv_with_options, merge_by_key, purchase_frequency, repeat_customers, write_csv,
};
use polars::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_orders() -> DataFrame {
    load_csv(fixtures_path().join("orders.csv")).expect("Failed to read orders fixture")
}

fn load_income() -> DataFrame {
    load_csv(fixtures_path().join("income.csv")).expect("Failed to read income fixture")
}

fn order_config() -> AnalyticsConfig {
    AnalyticsConfig::from_json_file(fixtures_path().join("analytics_config.json"))
        .expect("Failed to load config fixture")
}

fn cleaned_orders() -> DataFrame {
    DataCleaner
        .apply(&load_orders(), &order_config().cleaning_steps())
        .expect("Order cleaning should succeed")
}

fn cleaned_income() -> DataFrame {
    let config = AnalyticsConfig::builder()
        .columns_to_extract_integers(["Order/adjustment ID"])
        .first_rows_to_trim(1)
        .last_rows_to_trim(1)
        .build()
        .expect("Income config should validate");
    DataCleaner
        .apply(&load_income(), &config.cleaning_steps())
        .expect("Income cleaning should succeed")
}

// ============================================================================
// Fixture Loading Tests
// ============================================================================

#[test]
fn test_load_orders_fixture() {
    let df = load_orders();
    assert_eq!(df.shape(), (10, 9));
    assert!(df.column("Buyer Username").is_ok());
    assert!(df.column("Cancelation/Return Type").is_ok());
}

#[test]
fn test_load_skips_first_data_row_when_requested() {
    let df = load_csv_with_options(fixtures_path().join("orders.csv"), true)
        .expect("Failed to read orders fixture");

    // The banner row is gone and the first real order leads
    assert_eq!(df.height(), 9);
    let ids = df.column("Order ID").unwrap();
    assert_eq!(ids.get(0).unwrap(), AnyValue::String("577001"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_fixture_loads_with_defaults() {
    let config = order_config();

    assert_eq!(config.columns_to_delete, vec!["Notes".to_string()]);
    assert_eq!(config.keywords_to_filter, vec!["sample".to_string()]);
    assert_eq!(config.first_rows_to_trim, 1);
    assert_eq!(config.last_rows_to_trim, 1);
    assert_eq!(config.merge_key_column.as_deref(), Some("Order ID"));

    // Fields absent from the JSON fall back to defaults
    assert!(config.columns_to_extract_integers.is_empty());
    assert_eq!(config.sku_denylist.len(), 4);
    assert!(config.sku_denylist.contains(&"so30".to_string()));
    assert_eq!(config.allowed_variations, vec![1, 7, 15, 30]);
    assert!(!config.skip_first_data_row);

    assert_eq!(config.cleaning_steps().len(), 4);
}

// ============================================================================
// Cleaning Pipeline Tests
// ============================================================================

#[test]
fn test_cleaning_removes_junk_rows_and_columns() {
    let (cleaned, summary) = DataCleaner
        .apply_with_summary(&load_orders(), &order_config().cleaning_steps())
        .expect("Order cleaning should succeed");

    // Banner row, totals row, and the sample-kit row are gone
    assert_eq!(cleaned.shape(), (7, 8));
    assert!(cleaned.column("Notes").is_err());

    assert_eq!(summary.rows_before, 10);
    assert_eq!(summary.rows_after, 7);
    assert_eq!(summary.columns_before, 9);
    assert_eq!(summary.columns_after, 8);
    assert_eq!(summary.steps_applied.len(), 4);
}

#[test]
fn test_keyword_in_deleted_column_does_not_drop_row() {
    let cleaned = cleaned_orders();

    // bob's order mentions "sample" only in the deleted Notes column
    let buyers = cleaned.column("Buyer Username").unwrap();
    assert_eq!(buyers.get(1).unwrap(), AnyValue::String("bob"));

    // The row whose SKU contains "sample" is filtered
    let skus =
        string_cells(cleaned.column("Seller SKU").unwrap().as_materialized_series()).unwrap();
    assert!(!skus.contains(&Some("SAMPLE-KIT".to_string())));
}

#[test]
fn test_income_cleaning_extracts_order_ids() {
    let cleaned = cleaned_income();

    assert_eq!(cleaned.height(), 7);
    let ids = cleaned.column("Order/adjustment ID").unwrap();
    assert_eq!(ids.dtype(), &DataType::Int64);
    assert_eq!(ids.get(0).unwrap(), AnyValue::Int64(577001));
    assert_eq!(ids.get(6).unwrap(), AnyValue::Int64(577008));
}

// ============================================================================
// Analytics Report Tests
// ============================================================================

#[test]
fn test_full_pipeline_report() {
    let config = order_config();
    let report = OrderAnalyzer
        .build_report(&cleaned_orders(), &config)
        .expect("Report should build");

    // 7 cleaned rows minus one denylisted SKU and one cancelled order
    assert_eq!(report.summary.total_orders, 5);
    assert_eq!(report.summary.total_items_sold, 122);
    assert_eq!(report.summary.unique_customers, 4);
    assert_eq!(report.summary.repeat_customers, 1);
    assert_eq!(report.repeat_customers.get("alice"), Some(&2));

    // The cancelled March order contributes no trend bucket
    assert_eq!(report.monthly_trend.len(), 2);
    assert_eq!(report.monthly_trend[0].month, "2024-01");
    assert_eq!(report.monthly_trend[0].orders, 2);
    assert_eq!(report.monthly_trend[1].month, "2024-02");
    assert_eq!(report.monthly_trend[1].orders, 3);

    let variations: Vec<(i64, i64)> = report
        .totals_by_variation
        .iter()
        .map(|t| (t.variation, t.total_items))
        .collect();
    assert_eq!(variations, vec![(1, 3), (7, 14), (15, 15), (30, 90)]);
    assert_eq!(report.totals_by_variation[3].total_orders, 3.0);

    let states: Vec<(&str, i64)> = report
        .totals_by_state
        .iter()
        .map(|t| (t.state.as_str(), t.total_items))
        .collect();
    assert_eq!(
        states,
        vec![("Texas", 74), ("California", 45), ("Nevada", 3)]
    );

    // California and Texas tie on order count; ties resolve lexicographically
    assert_eq!(report.top_state, "California");
}

#[test]
fn test_enrichment_drops_denylisted_and_cancelled() {
    let config = order_config();
    let enriched =
        enrich_orders(&cleaned_orders(), &config.sku_denylist).expect("Enrichment should succeed");

    assert_eq!(enriched.height(), 5);
    let totals =
        int_cells(enriched.column("Total Items").unwrap().as_materialized_series()).unwrap();
    assert_eq!(
        totals,
        vec![Some(30), Some(14), Some(15), Some(60), Some(3)]
    );
}

#[test]
fn test_purchase_frequency_matches_repeat_customers() {
    let config = order_config();
    let enriched =
        enrich_orders(&cleaned_orders(), &config.sku_denylist).expect("Enrichment should succeed");

    let repeat = repeat_customers(&enriched).unwrap();
    let frequency = purchase_frequency(&enriched, &repeat).unwrap();

    assert_eq!(repeat.len(), 1);
    assert_eq!(frequency, repeat);
}

// ============================================================================
// Merge Tests
// ============================================================================

#[test]
fn test_merge_appends_key_column() {
    let merged = merge_by_key(&cleaned_income(), &cleaned_orders(), "Order ID")
        .expect("Merge should succeed");

    assert_eq!(merged.height(), 7);
    assert_eq!(merged.width(), 4);

    // Cleaned exports cover the same orders in the same positions
    let key = merged.column("Order ID").unwrap();
    assert_eq!(key.get(0).unwrap(), AnyValue::String("577001"));
    assert_eq!(key.get(3).unwrap(), AnyValue::String("577005"));
    assert_eq!(key.get(6).unwrap(), AnyValue::String("577008"));
}

#[test]
fn test_merge_rejects_mismatched_row_counts() {
    // Raw orders still carry the banner, sample, and totals rows
    let err = merge_by_key(&cleaned_income(), &load_orders(), "Order ID").unwrap_err();

    assert_eq!(err.error_code(), "ROW_COUNT_MISMATCH");
    assert!(matches!(
        err,
        AnalyticsError::RowCountMismatch { left: 7, right: 10 }
    ));
}

// ============================================================================
// Output Tests
// ============================================================================

#[test]
fn test_write_csv_round_trip() {
    let mut cleaned = cleaned_orders();
    let path = std::env::temp_dir().join("order_analytics_roundtrip.csv");

    write_csv(&mut cleaned, &path).expect("Failed to write CSV");
    let reloaded = load_csv(&path).expect("Failed to reload CSV");
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded.shape(), cleaned.shape());
    assert!(reloaded.column("Buyer Username").is_ok());
}
