//! Configuration types for the cleaning and analytics pipeline.
//!
//! `AnalyticsConfig` captures everything callers can vary: which cleaning
//! steps run (and with what arguments), the SKU denylist, the variation
//! codes that participate in per-variation totals, and loader behavior.
//! Use `AnalyticsConfig::builder()` for a fluent API, or deserialize from
//! JSON. Missing JSON fields fall back to defaults.

use crate::cleaner::CleaningStep;
use crate::error::Result as AnalyticsResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// SKU fragments excluded from analysis by default.
///
/// Orders whose `Seller SKU` contains any of these (case-insensitive) are
/// internal sample or giveaway codes, not real sales.
pub const DEFAULT_SKU_DENYLIST: [&str; 4] = ["vco30", "vco50", "so30", "so50"];

/// Variation codes that participate in per-variation totals by default.
pub const DEFAULT_ALLOWED_VARIATIONS: [i64; 4] = [1, 7, 15, 30];

/// Keyword suggestions surfaced by interactive frontends for row filtering.
///
/// These are offered as choices, not applied automatically.
pub const SUGGESTED_FILTER_KEYWORDS: [&str; 2] = ["ml", "add_more"];

/// Configuration for the cleaning and analytics pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Columns removed before any row-level cleaning runs.
    /// Default: empty (no columns deleted)
    pub columns_to_delete: Vec<String>,

    /// Rows containing any of these keywords (case-insensitive, any column)
    /// are dropped.
    /// Default: empty (no keyword filtering)
    pub keywords_to_filter: Vec<String>,

    /// Columns whose cells are replaced by their first digit run.
    /// Default: empty (no extraction)
    pub columns_to_extract_integers: Vec<String>,

    /// Number of leading rows to remove after filtering.
    /// Default: 0
    pub first_rows_to_trim: usize,

    /// Number of trailing rows to remove, applied last.
    /// Default: 0
    pub last_rows_to_trim: usize,

    /// Column projected from the secondary dataset when merging.
    /// Default: None (merging disabled)
    pub merge_key_column: Option<String>,

    /// SKU fragments whose orders are excluded from analysis (case-insensitive).
    /// Default: the vendor sample codes in `DEFAULT_SKU_DENYLIST`
    pub sku_denylist: Vec<String>,

    /// Variation codes included in per-variation totals.
    /// Default: `DEFAULT_ALLOWED_VARIATIONS`
    pub allowed_variations: Vec<i64>,

    /// Drop the first data row after the header when loading CSV files.
    /// Some vendor exports repeat the header as the first data row.
    /// Default: false
    pub skip_first_data_row: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            columns_to_delete: Vec::new(),
            keywords_to_filter: Vec::new(),
            columns_to_extract_integers: Vec::new(),
            first_rows_to_trim: 0,
            last_rows_to_trim: 0,
            merge_key_column: None,
            sku_denylist: DEFAULT_SKU_DENYLIST.iter().map(|s| s.to_string()).collect(),
            allowed_variations: DEFAULT_ALLOWED_VARIATIONS.to_vec(),
            skip_first_data_row: false,
        }
    }
}

impl AnalyticsConfig {
    /// Create a builder for fluent configuration.
    pub fn builder() -> AnalyticsConfigBuilder {
        AnalyticsConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AnalyticsConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for &variation in &self.allowed_variations {
            if variation <= 0 {
                return Err(ConfigValidationError::InvalidVariationCode(variation));
            }
        }

        if let Some(key) = &self.merge_key_column
            && key.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyMergeKey);
        }

        if self.keywords_to_filter.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyFilterKeyword);
        }

        if self.sku_denylist.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyDenylistEntry);
        }

        Ok(())
    }

    /// Assemble the configured cleaning steps.
    ///
    /// Steps come back in canonical application order; fields left at their
    /// defaults contribute no step.
    pub fn cleaning_steps(&self) -> Vec<CleaningStep> {
        let mut steps = Vec::new();

        if !self.columns_to_delete.is_empty() {
            steps.push(CleaningStep::DeleteColumns {
                columns: self.columns_to_delete.clone(),
            });
        }
        if !self.keywords_to_filter.is_empty() {
            steps.push(CleaningStep::FilterRowsByKeyword {
                keywords: self.keywords_to_filter.clone(),
            });
        }
        if !self.columns_to_extract_integers.is_empty() {
            steps.push(CleaningStep::ExtractIntegers {
                columns: self.columns_to_extract_integers.clone(),
            });
        }
        if self.first_rows_to_trim > 0 {
            steps.push(CleaningStep::TrimFirstN {
                rows: self.first_rows_to_trim,
            });
        }
        if self.last_rows_to_trim > 0 {
            steps.push(CleaningStep::TrimLastN {
                rows: self.last_rows_to_trim,
            });
        }

        steps
    }
}

/// Error type for configuration validation.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("allowed_variations entries must be positive, got {0}")]
    InvalidVariationCode(i64),

    #[error("merge_key_column must not be empty when set")]
    EmptyMergeKey,

    #[error("keywords_to_filter entries must not be empty")]
    EmptyFilterKeyword,

    #[error("sku_denylist entries must not be empty")]
    EmptyDenylistEntry,
}

/// Builder for `AnalyticsConfig`.
#[derive(Debug, Default)]
pub struct AnalyticsConfigBuilder {
    columns_to_delete: Option<Vec<String>>,
    keywords_to_filter: Option<Vec<String>>,
    columns_to_extract_integers: Option<Vec<String>>,
    first_rows_to_trim: Option<usize>,
    last_rows_to_trim: Option<usize>,
    merge_key_column: Option<String>,
    sku_denylist: Option<Vec<String>>,
    allowed_variations: Option<Vec<i64>>,
    skip_first_data_row: Option<bool>,
}

impl AnalyticsConfigBuilder {
    /// Set the columns to delete.
    pub fn columns_to_delete<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_delete = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the keywords used for row filtering.
    pub fn keywords_to_filter<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords_to_filter = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns subject to integer extraction.
    pub fn columns_to_extract_integers<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_extract_integers = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of leading rows to trim.
    pub fn first_rows_to_trim(mut self, rows: usize) -> Self {
        self.first_rows_to_trim = Some(rows);
        self
    }

    /// Set the number of trailing rows to trim.
    pub fn last_rows_to_trim(mut self, rows: usize) -> Self {
        self.last_rows_to_trim = Some(rows);
        self
    }

    /// Set the merge key column.
    pub fn merge_key_column(mut self, column: impl Into<String>) -> Self {
        self.merge_key_column = Some(column.into());
        self
    }

    /// Replace the default SKU denylist.
    pub fn sku_denylist<I, S>(mut self, denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sku_denylist = Some(denylist.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the default allowed variation codes.
    pub fn allowed_variations<I>(mut self, variations: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.allowed_variations = Some(variations.into_iter().collect());
        self
    }

    /// Drop the first data row after the header when loading.
    pub fn skip_first_data_row(mut self, skip: bool) -> Self {
        self.skip_first_data_row = Some(skip);
        self
    }

    /// Build the configuration, validating the final values.
    pub fn build(self) -> Result<AnalyticsConfig, ConfigValidationError> {
        let defaults = AnalyticsConfig::default();

        let config = AnalyticsConfig {
            columns_to_delete: self.columns_to_delete.unwrap_or(defaults.columns_to_delete),
            keywords_to_filter: self
                .keywords_to_filter
                .unwrap_or(defaults.keywords_to_filter),
            columns_to_extract_integers: self
                .columns_to_extract_integers
                .unwrap_or(defaults.columns_to_extract_integers),
            first_rows_to_trim: self
                .first_rows_to_trim
                .unwrap_or(defaults.first_rows_to_trim),
            last_rows_to_trim: self.last_rows_to_trim.unwrap_or(defaults.last_rows_to_trim),
            merge_key_column: self.merge_key_column.or(defaults.merge_key_column),
            sku_denylist: self.sku_denylist.unwrap_or(defaults.sku_denylist),
            allowed_variations: self
                .allowed_variations
                .unwrap_or(defaults.allowed_variations),
            skip_first_data_row: self
                .skip_first_data_row
                .unwrap_or(defaults.skip_first_data_row),
        };

        config.validate()?;
        Ok(config)
    }
}
