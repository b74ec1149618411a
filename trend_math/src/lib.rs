//! # Trend Math
//!
//! Numeric building blocks for search-interest trend forecasting.
//! This crate has no I/O; it provides the calculations the forecasting
//! pipeline is assembled from:
//!
//! - Least-squares trend lines over an integer time index
//! - Sample statistics, rolling volatility and accuracy measures
//! - "Min" ranking with ties
//! - A Nelder-Mead minimiser used for model fitting
//! - KPSS stationarity testing and differencing

use thiserror::Error;

pub mod optimize;
pub mod ranking;
pub mod regression;
pub mod stationarity;
pub mod stats;

/// Errors that can occur in trend calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trend math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 points"
        );
    }
}
