use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Required column '{0}' not found in DataFrame")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Unexpected null in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Hourly timestamp '{0}' does not start with a YYYY-MM-DD date")]
    InvalidTimestamp(String),

    #[error("Report row has unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("Aggregated day_date '{0}' is not a valid date")]
    InvalidDayDate(String, #[source] chrono::ParseError),

    #[error("Failed to create artifact file '{0}'")]
    ArtifactCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write header of artifact file '{0}'")]
    ArtifactHeader(PathBuf, #[source] std::io::Error),

    #[error("Failed to write artifact file '{0}'")]
    ArtifactWrite(PathBuf, #[source] PolarsError),
}
