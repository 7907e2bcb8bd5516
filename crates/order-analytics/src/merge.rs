//! Positional merge of two row-aligned datasets.

use crate::error::{AnalyticsError, Result};
use crate::utils::required_column;
use polars::prelude::*;
use tracing::debug;

/// Append `key_column` from `key_source` to all of `base`'s columns.
///
/// The merge is positional: row `i` of the result is row `i` of `base` plus
/// row `i`'s key cell from `key_source`. No join keys are matched, so both
/// frames must have been cleaned to the same height first; differing heights
/// fail with [`AnalyticsError::RowCountMismatch`] before any columns move.
pub fn merge_by_key(
    base: &DataFrame,
    key_source: &DataFrame,
    key_column: &str,
) -> Result<DataFrame> {
    let key = required_column(key_source, key_column)?;

    if base.height() != key_source.height() {
        return Err(AnalyticsError::RowCountMismatch {
            left: base.height(),
            right: key_source.height(),
        });
    }

    let merged = base.hstack(&[key.clone()])?;
    debug!(
        "Merged '{}' onto {} columns over {} rows",
        key_column,
        base.width(),
        merged.height()
    );
    Ok(merged)
}
