//! Utility functions shared across cleaning and analytics operations.

use crate::error::{AnalyticsError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;

// Digit run pattern - compiled once at startup
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("Invalid regex: digit run"));

// ============================================================================
// String Parsing Utilities
// ============================================================================

/// Extract the first contiguous run of ASCII digits from a string.
///
/// Returns `None` when the string contains no digits, or when the digit run
/// does not fit in an `i64`.
pub fn first_digit_run(text: &str) -> Option<i64> {
    DIGIT_RUN.find(text)?.as_str().parse::<i64>().ok()
}

/// Parse a variation code from free-form variation text.
///
/// Vendor exports write variations as "30ml", "Pack of 7", etc. The numeric
/// code is the first digit run; text without digits maps to 0 so downstream
/// arithmetic never sees a null.
pub fn variation_code(text: &str) -> i64 {
    first_digit_run(text).unwrap_or(0)
}

/// Coerce free-form text to an integer, defaulting to 0.
///
/// Accepts integer and float notation (floats are truncated toward zero).
/// Anything unparseable, including empty strings, becomes 0. This mirrors
/// how quantity fields are normalized: coercion never fails.
pub fn int_or_zero(text: &str) -> i64 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value;
    }
    if let Ok(value) = trimmed.parse::<f64>()
        && value.is_finite()
    {
        return value as i64;
    }
    0
}

// ============================================================================
// Series Access Utilities
// ============================================================================

/// Look up a column, mapping the Polars "not found" error to our own.
pub fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| AnalyticsError::ColumnNotFound(name.to_string()))
}

/// Materialize a series as owned string cells, preserving nulls.
///
/// Non-string columns are cast first, so numeric cells come back as their
/// textual form ("30" for an integer 30).
pub fn string_cells(series: &Series) -> Result<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let chunked = casted.str()?;
    Ok(chunked
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect())
}

/// Materialize a series as integer cells, preserving nulls.
///
/// Values that cannot be represented as `i64` (unparseable strings after a
/// cast) come back as `None`.
pub fn int_cells(series: &Series) -> Result<Vec<Option<i64>>> {
    let casted = series.cast(&DataType::Int64)?;
    let chunked = casted.i64()?;
    Ok(chunked.into_iter().collect())
}

// ============================================================================
// Series Statistics Utilities
// ============================================================================

/// Most frequent string value in a series, ignoring nulls.
///
/// Ties resolve to the lexicographically smallest value so repeated runs over
/// the same data always report the same mode. Returns `None` for series with
/// no non-null values.
pub fn string_mode(series: &Series) -> Result<Option<String>> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(None);
    }

    let str_series = non_null.cast(&DataType::String)?;
    let chunked = str_series.str()?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in chunked.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(value, _)| value))
}

// ============================================================================
// Tests
// ============================================================================
