//! Row-level filters: keyword matching and positional trims.

use crate::error::Result;
use crate::utils::string_cells;
use polars::prelude::*;
use tracing::debug;

/// Drop rows where any cell contains any of `keywords`, case-insensitively.
///
/// Matching is per cell against the cell's string form, so numeric cells
/// match on their textual rendering. Null cells never match, which keeps
/// sparse rows. Applying the same filter twice is a no-op.
pub fn filter_rows_by_keyword(df: &DataFrame, keywords: &[String]) -> Result<DataFrame> {
    if keywords.is_empty() || df.height() == 0 {
        return Ok(df.clone());
    }

    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let height = df.height();
    let mut matched = vec![false; height];

    for column in df.get_columns() {
        let cells = string_cells(column.as_materialized_series())?;
        for (row, cell) in cells.iter().enumerate() {
            if matched[row] {
                continue;
            }
            if let Some(text) = cell {
                let lower = text.to_lowercase();
                if needles.iter().any(|needle| lower.contains(needle)) {
                    matched[row] = true;
                }
            }
        }
    }

    let keep: Vec<bool> = matched.iter().map(|hit| !hit).collect();
    let mask = BooleanChunked::from_slice("keyword_filter".into(), &keep);
    let filtered = df.filter(&mask)?;

    debug!(
        "Keyword filter removed {} of {} rows",
        height - filtered.height(),
        height
    );
    Ok(filtered)
}

/// Remove the first `rows` rows, preserving the rest in order.
///
/// Trimming at least the full height yields an empty frame with the schema
/// intact.
pub fn trim_first_rows(df: &DataFrame, rows: usize) -> DataFrame {
    if rows == 0 {
        return df.clone();
    }
    if rows >= df.height() {
        return df.clear();
    }
    df.slice(rows as i64, df.height() - rows)
}

/// Remove the last `rows` rows, preserving the rest in order.
pub fn trim_last_rows(df: &DataFrame, rows: usize) -> DataFrame {
    if rows == 0 {
        return df.clone();
    }
    if rows >= df.height() {
        return df.clear();
    }
    df.slice(0, df.height() - rows)
}
