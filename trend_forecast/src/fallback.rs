//! Deterministic trend-line fallback

use crate::data::NormalizedSeries;
use crate::error::{ForecastError, Result};
use trend_math::regression::LinearTrend;

/// Single-step estimate used when no model forecast exists
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackResult {
    pub keyword: String,
    pub estimate: f64,
}

/// Extrapolates a least-squares line through the most recent observations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackEstimator {
    window: usize,
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self { window: 60 }
    }
}

impl FallbackEstimator {
    /// Create an estimator looking at the last `window` observations
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fallback window must be greater than zero".to_string(),
            ));
        }
        Ok(Self { window })
    }

    /// Number of trailing observations the line is fitted to
    pub fn window(&self) -> usize {
        self.window
    }

    /// Estimate the next value of a normalized series
    pub fn estimate(&self, series: &NormalizedSeries) -> Result<FallbackResult> {
        self.estimate_values(series.keyword(), series.values())
    }

    /// Estimate the value one step past the last of `values`
    pub fn estimate_values(&self, keyword: &str, values: &[f64]) -> Result<FallbackResult> {
        if values.is_empty() {
            return Err(ForecastError::InsufficientData {
                keyword: keyword.to_string(),
                reason: "no observations to fit a trend line".to_string(),
            });
        }

        let trend = LinearTrend::fit_tail(values, self.window)?;
        let estimate = trend.forecast(1);

        tracing::info!(
            keyword,
            observations = trend.len(),
            slope = trend.slope(),
            estimate,
            "Trend-line fallback estimate"
        );

        Ok(FallbackResult {
            keyword: keyword.to_string(),
            estimate,
        })
    }
}
