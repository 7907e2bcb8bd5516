//! Data cleaning operations over tabular order and income exports.
//!
//! Callers describe what to clean as a list of [`CleaningStep`]s; the
//! [`DataCleaner`] always executes them in canonical order (columns first,
//! then row filters, then positional trims) no matter how the list was
//! assembled. Every step returns a new frame; the input is never mutated.

mod extractors;
mod filters;

use crate::error::{Result, ResultExt};
use crate::types::CleaningSummary;
use extractors::extract_integer_runs;
use filters::{filter_rows_by_keyword, trim_first_rows, trim_last_rows};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A single cleaning operation with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CleaningStep {
    /// Remove the named columns. Unknown names are ignored.
    DeleteColumns { columns: Vec<String> },
    /// Drop rows where any cell contains any keyword (case-insensitive).
    FilterRowsByKeyword { keywords: Vec<String> },
    /// Replace cells in the named columns with their first digit run.
    ExtractIntegers { columns: Vec<String> },
    /// Remove the first `rows` rows.
    TrimFirstN { rows: usize },
    /// Remove the last `rows` rows.
    TrimLastN { rows: usize },
}

impl CleaningStep {
    /// Canonical application order.
    ///
    /// Columns go first so row filters never match soon-to-be-deleted data;
    /// trims go last because they are positional and must see the final row
    /// count.
    pub fn priority(&self) -> u8 {
        match self {
            Self::DeleteColumns { .. } => 1,
            Self::FilterRowsByKeyword { .. } => 2,
            Self::ExtractIntegers { .. } => 3,
            Self::TrimFirstN { .. } => 4,
            Self::TrimLastN { .. } => 5,
        }
    }

    /// Short name for logs and error context.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DeleteColumns { .. } => "Delete Columns",
            Self::FilterRowsByKeyword { .. } => "Filter Rows By Keyword",
            Self::ExtractIntegers { .. } => "Extract Integers",
            Self::TrimFirstN { .. } => "Trim First Rows",
            Self::TrimLastN { .. } => "Trim Last Rows",
        }
    }

    /// Human-readable description including parameters.
    pub fn describe(&self) -> String {
        match self {
            Self::DeleteColumns { columns } => {
                format!("Delete columns: {}", columns.join(", "))
            }
            Self::FilterRowsByKeyword { keywords } => {
                format!("Filter rows containing: {}", keywords.join(", "))
            }
            Self::ExtractIntegers { columns } => {
                format!("Extract integers from: {}", columns.join(", "))
            }
            Self::TrimFirstN { rows } => format!("Trim first {} rows", rows),
            Self::TrimLastN { rows } => format!("Trim last {} rows", rows),
        }
    }
}

/// Executes cleaning steps in canonical order.
pub struct DataCleaner;

static_assertions::assert_impl_all!(DataCleaner: Send, Sync);
static_assertions::assert_impl_all!(CleaningStep: Send, Sync);

impl DataCleaner {
    /// Apply the given steps, reordered canonically, returning the cleaned frame.
    pub fn apply(&self, df: &DataFrame, steps: &[CleaningStep]) -> Result<DataFrame> {
        self.apply_with_summary(df, steps)
            .map(|(cleaned, _)| cleaned)
    }

    /// Apply the given steps and report shape changes alongside the result.
    pub fn apply_with_summary(
        &self,
        df: &DataFrame,
        steps: &[CleaningStep],
    ) -> Result<(DataFrame, CleaningSummary)> {
        let mut summary = CleaningSummary {
            rows_before: df.height(),
            columns_before: df.width(),
            ..Default::default()
        };

        // Stable sort: duplicate steps of the same kind keep caller order
        let mut ordered: Vec<&CleaningStep> = steps.iter().collect();
        ordered.sort_by_key(|step| step.priority());

        let mut current = df.clone();
        for step in ordered {
            debug!("Applying step: {}", step.describe());
            current = self.apply_step(&current, step)?;
            summary.steps_applied.push(step.describe());
        }

        summary.rows_after = current.height();
        summary.columns_after = current.width();
        info!(
            "Cleaning complete: {} -> {} rows, {} -> {} columns",
            summary.rows_before, summary.rows_after, summary.columns_before, summary.columns_after
        );

        Ok((current, summary))
    }

    fn apply_step(&self, df: &DataFrame, step: &CleaningStep) -> Result<DataFrame> {
        match step {
            CleaningStep::DeleteColumns { columns } => Ok(delete_columns(df, columns)),
            CleaningStep::FilterRowsByKeyword { keywords } => {
                filter_rows_by_keyword(df, keywords).context(step.display_name())
            }
            CleaningStep::ExtractIntegers { columns } => {
                extract_integer_runs(df, columns).context(step.display_name())
            }
            CleaningStep::TrimFirstN { rows } => Ok(trim_first_rows(df, *rows)),
            CleaningStep::TrimLastN { rows } => Ok(trim_last_rows(df, *rows)),
        }
    }
}

/// Remove the named columns, ignoring names not present.
///
/// Uploaded files frequently miss optional columns, so deletion tolerates
/// partial schema mismatches instead of failing the whole run.
fn delete_columns(df: &DataFrame, columns: &[String]) -> DataFrame {
    let existing: Vec<PlSmallStr> = columns
        .iter()
        .filter(|name| df.column(name).is_ok())
        .map(|name| name.as_str().into())
        .collect();

    if existing.is_empty() {
        return df.clone();
    }

    debug!(
        "Deleting {} of {} requested columns",
        existing.len(),
        columns.len()
    );
    df.drop_many(existing)
}
