//! Error types for the trend_forecast crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the trend_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A series had no rows with a usable date
    #[error("Empty series for '{keyword}': no rows with a valid date")]
    EmptySeries { keyword: String },

    /// The order search found no convergent model; callers fall back
    #[error("Model fit failed for '{keyword}': {reason}")]
    ModelFit { keyword: String, reason: String },

    /// The fallback estimator had nothing to fit
    #[error("Insufficient data for '{keyword}': {reason}")]
    InsufficientData { keyword: String, reason: String },

    /// An input file lacks a column the pipeline needs
    #[error("Missing required column '{column}' in {}", .path.display())]
    MissingRequiredColumn { column: String, path: PathBuf },

    /// Neither a model forecast nor a fallback estimate exists for a tracked keyword
    #[error("No forecast available for '{keyword}': neither model output nor fallback estimate")]
    NoForecastAvailable { keyword: String },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from numeric routines
    #[error("Math error: {0}")]
    MathError(#[from] trend_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error reading or writing CSV records
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error parsing configuration
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    /// Whether the error is a recoverable per-keyword model failure
    pub fn is_model_fit(&self) -> bool {
        matches!(self, ForecastError::ModelFit { .. })
    }
}
