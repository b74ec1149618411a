//! Automatic ARIMA order selection
//!
//! The differencing order comes from repeated KPSS tests. AR and MA orders are
//! chosen by a stepwise walk over neighbouring orders that moves whenever a
//! neighbour strictly lowers the AIC. Orders whose fit does not converge are
//! skipped; if none converges the search reports a model-fit failure.

use crate::data::NormalizedSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, ArimaOrder, TrainedArimaModel};
use crate::models::ForecastModel;
use std::collections::HashSet;
use trend_math::stationarity::differencing_order;

/// Upper bound on the number of fits one search may run
const DEFAULT_MAX_FITS: usize = 100;

/// One order visited by the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub order: ArimaOrder,
    /// AIC of the fit, or `None` if it failed to converge
    pub aic: Option<f64>,
}

/// Outcome of an order search
#[derive(Debug, Clone)]
pub struct OrderSearch {
    /// Lowest-AIC model found
    pub best: TrainedArimaModel,
    /// Every order tried, in the order it was tried
    pub candidates: Vec<CandidateScore>,
}

/// Stepwise automatic ARIMA
#[derive(Debug, Clone)]
pub struct AutoArima {
    name: String,
    max_p: usize,
    max_q: usize,
    max_d: usize,
    max_fits: usize,
}

impl Default for AutoArima {
    fn default() -> Self {
        Self::new(5, 5, 2)
    }
}

impl AutoArima {
    /// Create a search bounded by the given orders
    pub fn new(max_p: usize, max_q: usize, max_d: usize) -> Self {
        Self {
            name: "AutoARIMA".to_string(),
            max_p,
            max_q,
            max_d,
            max_fits: DEFAULT_MAX_FITS,
        }
    }

    /// Limit the number of candidate fits
    pub fn with_max_fits(mut self, max_fits: usize) -> Self {
        self.max_fits = max_fits.max(1);
        self
    }

    /// Run the search on a keyword's daily values
    pub fn search(&self, keyword: &str, values: &[f64]) -> Result<OrderSearch> {
        let d = differencing_order(values, self.max_d);
        let with_constant = d <= 1;

        let mut state = SearchState {
            keyword,
            values,
            tried: HashSet::new(),
            candidates: Vec::new(),
            best: None,
            max_fits: self.max_fits,
        };

        for (p, q) in [(2, 2), (0, 0), (1, 0), (0, 1)] {
            let order = ArimaOrder::new(p.min(self.max_p), d, q.min(self.max_q), with_constant);
            state.try_order(order);
        }

        loop {
            let Some(current) = state.best.as_ref().map(TrainedArimaModel::order) else {
                break;
            };

            let mut moved = false;
            for neighbour in self.neighbours(current) {
                if state.exhausted() {
                    break;
                }
                if state.try_order(neighbour) {
                    moved = true;
                    break;
                }
            }

            if !moved || state.exhausted() {
                break;
            }
        }

        let SearchState {
            best, candidates, ..
        } = state;

        match best {
            Some(best) => {
                tracing::info!(
                    keyword,
                    order = %best.order(),
                    aic = best.aic(),
                    fits = candidates.len(),
                    "Selected ARIMA order"
                );
                Ok(OrderSearch { best, candidates })
            }
            None => Err(ForecastError::ModelFit {
                keyword: keyword.to_string(),
                reason: format!(
                    "no convergent model among {} candidate orders",
                    candidates.len()
                ),
            }),
        }
    }

    /// Orders one step away from `order`, within bounds
    fn neighbours(&self, order: ArimaOrder) -> Vec<ArimaOrder> {
        let ArimaOrder {
            p,
            d,
            q,
            with_constant,
        } = order;
        let steps: [(i64, i64); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (1, 1),
            (-1, 1),
            (1, -1),
        ];

        let mut orders: Vec<ArimaOrder> = steps
            .iter()
            .filter_map(|(dp, dq)| {
                let np = p as i64 + dp;
                let nq = q as i64 + dq;
                let in_bounds =
                    np >= 0 && nq >= 0 && np <= self.max_p as i64 && nq <= self.max_q as i64;
                in_bounds.then(|| ArimaOrder::new(np as usize, d, nq as usize, with_constant))
            })
            .collect();

        if d <= 1 {
            orders.push(ArimaOrder::new(p, d, q, !with_constant));
        }
        orders
    }
}

/// Bookkeeping shared by the starting fits and the stepwise walk
struct SearchState<'a> {
    keyword: &'a str,
    values: &'a [f64],
    tried: HashSet<ArimaOrder>,
    candidates: Vec<CandidateScore>,
    best: Option<TrainedArimaModel>,
    max_fits: usize,
}

impl SearchState<'_> {
    fn exhausted(&self) -> bool {
        self.candidates.len() >= self.max_fits
    }

    /// Fit `order` if it is new; returns whether it became the best model
    fn try_order(&mut self, order: ArimaOrder) -> bool {
        if self.exhausted() || !self.tried.insert(order) {
            return false;
        }

        let fitted = ArimaModel::new(order).fit(self.keyword, self.values);
        let aic = fitted.as_ref().ok().map(TrainedArimaModel::aic);
        tracing::debug!(keyword = self.keyword, %order, ?aic, "Tried ARIMA order");
        self.candidates.push(CandidateScore { order, aic });

        match fitted {
            Ok(model) if self.best.as_ref().map_or(true, |best| model.aic() < best.aic()) => {
                self.best = Some(model);
                true
            }
            _ => false,
        }
    }
}

impl ForecastModel for AutoArima {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &NormalizedSeries) -> Result<TrainedArimaModel> {
        Ok(self.search(series.keyword(), series.values())?.best)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
