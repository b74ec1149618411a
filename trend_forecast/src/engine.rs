//! Per-keyword forecasting with holdout evaluation

use crate::config::{HoldoutPolicy, PipelineConfig};
use crate::data::NormalizedSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaOrder;
use crate::models::auto_arima::AutoArima;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::utils::future_dates;
use chrono::NaiveDate;

/// One forecast step with its confidence bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Model forecast for one keyword
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub keyword: String,
    /// Selected model order
    pub order: ArimaOrder,
    /// One entry per requested step, starting the day after the last training date
    pub horizon_points: Vec<HorizonPoint>,
    /// Accuracy on the withheld tail, when one was reserved
    pub holdout_rmse: Option<f64>,
}

impl ForecastResult {
    /// Point estimate of the first step
    pub fn first_estimate(&self) -> Option<f64> {
        self.horizon_points.first().map(|p| p.point_estimate)
    }

    /// Number of forecast steps
    pub fn len(&self) -> usize {
        self.horizon_points.len()
    }

    /// Whether the forecast has no steps
    pub fn is_empty(&self) -> bool {
        self.horizon_points.is_empty()
    }
}

/// Fits an automatically selected ARIMA model per keyword
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    model: AutoArima,
    holdout: HoldoutPolicy,
    confidence_level: f64,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl ForecastEngine {
    /// Create an engine from the pipeline configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            model: AutoArima::new(config.max_p, config.max_q, config.max_d),
            holdout: config.holdout,
            confidence_level: config.confidence_level,
        }
    }

    /// Replace the holdout policy
    pub fn with_holdout(mut self, holdout: HoldoutPolicy) -> Self {
        self.holdout = holdout;
        self
    }

    /// Replace the confidence level of the bounds
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Forecast `horizon` days past the training data
    ///
    /// Returns `Ok(None)` when no model order converges, so the caller can fall
    /// back for this keyword without aborting the run.
    pub fn forecast(
        &self,
        series: &NormalizedSeries,
        horizon: usize,
    ) -> Result<Option<ForecastResult>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }

        match self.fit_and_forecast(series, horizon) {
            Ok(result) => Ok(Some(result)),
            Err(err) if err.is_model_fit() => {
                tracing::warn!(
                    keyword = series.keyword(),
                    error = %err,
                    "No ARIMA model; keyword needs fallback"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Forecast, surfacing a model-fit failure as an error
    pub fn fit_and_forecast(
        &self,
        series: &NormalizedSeries,
        horizon: usize,
    ) -> Result<ForecastResult> {
        let split = self
            .holdout
            .holdout_len(series.len())
            .and_then(|days| series.split_tail(days));

        let (training, holdout) = match &split {
            Some((head, tail)) => (head, Some(*tail)),
            None => (series, None),
        };

        let model = self.model.train(training)?;
        let forecast = model.forecast_with_intervals(horizon, self.confidence_level)?;
        let intervals = forecast.intervals().ok_or_else(|| {
            ForecastError::DataError(format!("{} produced no confidence bounds", model.name()))
        })?;

        let horizon_points = future_dates(training.end_date(), horizon)
            .into_iter()
            .zip(forecast.values())
            .zip(intervals)
            .map(|((date, &point_estimate), &(lower_bound, upper_bound))| HorizonPoint {
                date,
                point_estimate,
                lower_bound,
                upper_bound,
            })
            .collect();

        let holdout_rmse = match holdout {
            Some(actual) => Some(model.forecast(actual.len())?.root_mean_squared_error(actual)?),
            None => None,
        };

        tracing::info!(
            keyword = series.keyword(),
            order = %model.order(),
            horizon,
            holdout_rmse = ?holdout_rmse,
            "Forecast complete"
        );

        Ok(ForecastResult {
            keyword: series.keyword().to_string(),
            order: model.order(),
            horizon_points,
            holdout_rmse,
        })
    }
}
