//! Custom error types for the order analytics pipeline.
//!
//! This module provides the error hierarchy for the crate using `thiserror`.
//! Errors carry enough context (column names, row indices, dataset sizes) to
//! diagnose bad input data without re-running the pipeline.
//!
//! Errors are serializable as `{code, message}` structs so callers emitting
//! machine-readable output can forward them unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analytics pipeline.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A timestamp cell did not match the expected day-first format.
    #[error("Malformed timestamp '{value}' in column '{column}' at row {row} (expected DD/MM/YYYY HH:MM:SS)")]
    MalformedTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    /// Two datasets that must align row-for-row have different heights.
    #[error("Row count mismatch: left dataset has {left} rows, right dataset has {right} rows")]
    RowCountMismatch { left: usize, right: usize },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    ///
    /// These codes let callers distinguish error classes (e.g. retry an IO
    /// failure, reject a malformed upload) without parsing messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::MalformedTimestamp { .. } => "MALFORMED_TIMESTAMP",
            Self::RowCountMismatch { .. } => "ROW_COUNT_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error indicates bad input data rather than an
    /// environment or configuration failure.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::MalformedTimestamp { .. }
            | Self::RowCountMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

impl From<crate::config::ConfigValidationError> for AnalyticsError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        AnalyticsError::InvalidConfig(err.to_string())
    }
}

/// Serialize implementation for structured output.
///
/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to handle programmatically.
impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}
