//! Integer extraction from free-form text columns.

use crate::error::Result;
use crate::utils::{first_digit_run, required_column, string_cells};
use polars::prelude::*;
use tracing::debug;

/// Replace each cell in the named columns with its first digit run.
///
/// Cells without digits become null rather than zero so downstream
/// aggregation can tell "no code" from "code 0". Unlike column deletion,
/// extraction targets are explicit caller choices, so a missing column is
/// an error instead of a silent skip.
pub fn extract_integer_runs(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut result = df.clone();

    for name in columns {
        let column = required_column(&result, name)?;
        let cells = string_cells(column.as_materialized_series())?;

        let extracted: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(first_digit_run))
            .collect();

        let series = Series::new(name.as_str().into(), extracted);
        result.replace(name, series)?;
        debug!("Extracted integer runs from column '{}'", name);
    }

    Ok(result)
}
