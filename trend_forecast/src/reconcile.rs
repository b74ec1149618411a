//! Merging model forecasts and fallback estimates into one ranked table
//!
//! Every tracked keyword gets exactly one row. The model forecast wins when it
//! exists; otherwise the trend-line estimate is used, and a keyword with neither
//! is an error rather than a missing row.

use crate::data::NormalizedSeries;
use crate::engine::ForecastResult;
use crate::error::{ForecastError, Result};
use crate::fallback::{FallbackEstimator, FallbackResult};
use crate::utils::growth_percent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use trend_math::ranking::min_rank_descending;
use trend_math::stats::{round_to, tail_volatility};

/// Decimal places kept in reconciled values
pub const TABLE_PRECISION: u32 = 3;

/// Direction of the forecast relative to the current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    /// Compare a forecast with the current value
    pub fn between(current: f64, forecast: f64) -> Self {
        if forecast > current {
            TrendDirection::Up
        } else if forecast < current {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Up => "Up",
            TrendDirection::Down => "Down",
            TrendDirection::Stable => "Stable",
        };
        f.write_str(label)
    }
}

/// Where a row's forecast value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastSource {
    Model,
    Fallback,
}

/// One keyword's line in the comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRow {
    pub keyword: String,
    pub current_value: f64,
    pub forecast_value: f64,
    /// NaN when the current value is zero
    pub growth_percent: f64,
    pub trend_direction: TrendDirection,
    pub volatility: f64,
    /// 1 = highest growth; ties share the lower rank
    pub rank: usize,
    pub source: ForecastSource,
}

/// Rows sorted by ascending rank
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciledTable {
    rows: Vec<ReconciledRow>,
}

impl ReconciledTable {
    /// Rows in rank order
    pub fn rows(&self) -> &[ReconciledRow] {
        &self.rows
    }

    /// Row for a keyword
    pub fn get(&self, keyword: &str) -> Option<&ReconciledRow> {
        self.rows.iter().find(|row| row.keyword == keyword)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<ReconciledRow> {
        self.rows
    }
}

/// Builds the ranked comparison table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastReconciler {
    volatility_window: usize,
}

impl Default for ForecastReconciler {
    fn default() -> Self {
        Self {
            volatility_window: 7,
        }
    }
}

impl ForecastReconciler {
    /// Create a reconciler measuring volatility over `volatility_window` observations
    pub fn new(volatility_window: usize) -> Result<Self> {
        if volatility_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Volatility window must be greater than zero".to_string(),
            ));
        }
        Ok(Self { volatility_window })
    }

    /// Reconcile every keyword from already computed forecasts and fallbacks
    pub fn reconcile(
        &self,
        keywords: &[String],
        series: &HashMap<String, NormalizedSeries>,
        forecasts: &HashMap<String, ForecastResult>,
        fallbacks: &HashMap<String, FallbackResult>,
    ) -> Result<ReconciledTable> {
        let mut rows = Vec::with_capacity(keywords.len());

        for keyword in keywords {
            let history = series
                .get(keyword)
                .ok_or_else(|| ForecastError::EmptySeries {
                    keyword: keyword.clone(),
                })?;

            let (forecast_value, source) = match forecasts
                .get(keyword)
                .and_then(ForecastResult::first_estimate)
            {
                Some(estimate) => (estimate, ForecastSource::Model),
                None => match fallbacks.get(keyword) {
                    Some(fallback) => (fallback.estimate, ForecastSource::Fallback),
                    None => {
                        return Err(ForecastError::NoForecastAvailable {
                            keyword: keyword.clone(),
                        })
                    }
                },
            };

            let current_value = history.last_value();
            let volatility = tail_volatility(history.values(), self.volatility_window);

            rows.push(ReconciledRow {
                keyword: keyword.clone(),
                current_value: round_to(current_value, TABLE_PRECISION),
                forecast_value: round_to(forecast_value, TABLE_PRECISION),
                growth_percent: round_to(
                    growth_percent(current_value, forecast_value),
                    TABLE_PRECISION,
                ),
                trend_direction: TrendDirection::between(current_value, forecast_value),
                volatility: round_to(volatility, TABLE_PRECISION),
                rank: 0,
                source,
            });
        }

        let growth: Vec<f64> = rows.iter().map(|row| row.growth_percent).collect();
        for (row, rank) in rows.iter_mut().zip(min_rank_descending(&growth)) {
            row.rank = rank;
        }
        rows.sort_by_key(|row| row.rank);

        tracing::info!(
            keywords = rows.len(),
            fallbacks = rows
                .iter()
                .filter(|row| row.source == ForecastSource::Fallback)
                .count(),
            "Reconciled forecast table"
        );

        Ok(ReconciledTable { rows })
    }

    /// Reconcile, computing a trend-line estimate for every keyword without a model forecast
    pub fn reconcile_with_fallback(
        &self,
        keywords: &[String],
        series: &HashMap<String, NormalizedSeries>,
        forecasts: &HashMap<String, ForecastResult>,
        estimator: &FallbackEstimator,
    ) -> Result<ReconciledTable> {
        let mut fallbacks = HashMap::new();
        for keyword in keywords {
            if forecasts.contains_key(keyword) {
                continue;
            }
            if let Some(history) = series.get(keyword) {
                fallbacks.insert(keyword.clone(), estimator.estimate(history)?);
            }
        }

        self.reconcile(keywords, series, forecasts, &fallbacks)
    }
}
