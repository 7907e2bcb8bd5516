//! Order Analytics Pipeline Library
//!
//! A data cleaning and sales analytics library for vendor order exports,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! This library turns raw order and income CSV exports into reports:
//!
//! - **Data Cleaning**: Column deletion, keyword row filtering, integer
//!   extraction and positional trims, always applied in canonical order
//! - **Order Enrichment**: SKU denylist exclusion, variation code parsing,
//!   cancelled-order removal and a derived `Total Items` column
//! - **Sales Metrics**: Repeat customers, monthly purchase trend, totals by
//!   variation and by state, top state
//! - **Dataset Merging**: Positional merge of row-aligned exports
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use order_analytics::{AnalyticsConfig, DataCleaner, OrderAnalyzer, load_csv};
//!
//! let config = AnalyticsConfig::builder()
//!     .columns_to_delete(["Notes"])
//!     .keywords_to_filter(["ml"])
//!     .build()?;
//!
//! let raw = load_csv("orders.csv")?;
//! let cleaned = DataCleaner.apply(&raw, &config.cleaning_steps())?;
//! let report = OrderAnalyzer.build_report(&cleaned, &config)?;
//!
//! println!("Top state: {}", report.top_state);
//! for month in &report.monthly_trend {
//!     println!("{}  {}", month.month, month.orders);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`AnalyticsConfig`] to customize cleaning and analytics behavior:
//!
//! ```rust,ignore
//! use order_analytics::AnalyticsConfig;
//!
//! let config = AnalyticsConfig::builder()
//!     .columns_to_delete(["Notes", "Internal Id"])
//!     .keywords_to_filter(["ml", "add_more"])
//!     .columns_to_extract_integers(["Variation"])
//!     .first_rows_to_trim(1)              // Drop a stray header row
//!     .merge_key_column("Order Total")
//!     .allowed_variations([1, 7, 15, 30])
//!     .build()?;
//! ```
//!
//! Configurations also deserialize from JSON with per-field defaults, so a
//! frontend can send only the options the user touched.
//!
//! # Errors
//!
//! Fallible operations return [`AnalyticsResult`]. Structural problems
//! (missing columns, malformed timestamps, mismatched merge heights) abort
//! the single operation that hit them; the input frame is never left half
//! transformed. Numeric coercion is deliberately infallible: unparseable
//! quantities become 0, digitless variations become 0 or null depending on
//! the operation.

// Core modules
pub mod analytics;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analytics::{
    BUYER_COLUMN, CANCELLATION_COLUMN, CREATED_TIME_COLUMN, NO_DATA, OrderAnalyzer,
    QUANTITY_COLUMN, SELLER_SKU_COLUMN, STATE_COLUMN, TIMESTAMP_FORMAT, TOTAL_ITEMS_COLUMN,
    VARIATION_COLUMN, derive_total_items, derive_variation_codes, enrich_orders,
    exclude_cancelled_orders, exclude_denylisted_skus, monthly_purchase_trend, purchase_frequency,
    repeat_customers, summarize_orders, top_state, totals_by_state, totals_by_variation,
};
pub use cleaner::{CleaningStep, DataCleaner};
pub use config::{
    AnalyticsConfig, AnalyticsConfigBuilder, ConfigValidationError, DEFAULT_ALLOWED_VARIATIONS,
    DEFAULT_SKU_DENYLIST, SUGGESTED_FILTER_KEYWORDS,
};
pub use error::{AnalyticsError, Result as AnalyticsResult, ResultExt};
pub use io::{load_csv, load_csv_with_options, write_csv};
pub use merge::merge_by_key;
pub use types::{
    CleaningSummary, MonthlyCount, OrderReport, OrderSummary, StateTotals, VariationTotals,
};
