//! Forecasting models for daily interest series

use crate::data::NormalizedSeries;
use crate::error::{ForecastError, Result};
use std::fmt::Debug;

pub mod arima;
pub mod auto_arima;

/// Raw model output: point forecasts with optional confidence bounds
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
    /// Confidence intervals (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl ModelForecast {
    /// Create a new forecast
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self {
            values,
            horizons,
            intervals: None,
        })
    }

    /// Create a new forecast with confidence intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizons: usize,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        let mut forecast = Self::new(values, horizons)?;

        if forecast.values.len() != intervals.len() {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                forecast.values.len(),
                intervals.len()
            )));
        }

        forecast.intervals = Some(intervals);
        Ok(forecast)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Get the confidence intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Root mean squared error against observed values of the same length
    pub fn root_mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        Ok(trend_math::stats::root_mean_squared_error(
            &self.values,
            actual,
        )?)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Point forecasts for the next `horizons` periods
    fn forecast(&self, horizons: usize) -> Result<ModelForecast>;

    /// Point forecasts with two-sided bounds at `confidence_level`
    fn forecast_with_intervals(
        &self,
        horizons: usize,
        confidence_level: f64,
    ) -> Result<ModelForecast>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a normalized series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a normalized series
    fn train(&self, series: &NormalizedSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
