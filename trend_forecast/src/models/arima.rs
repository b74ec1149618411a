//! ARIMA models for daily interest series
//!
//! An ARIMA(p, d, q) model is fitted by differencing the series `d` times and
//! estimating an ARMA(p, q) model on the result by conditional sum of squares.
//! Coefficients are searched in an unconstrained space and mapped through
//! partial autocorrelations, so every candidate the optimiser visits has a
//! stationary AR part and an invertible MA part.

use crate::data::NormalizedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ModelForecast, TrainedForecastModel};
use std::f64::consts::PI;
use std::fmt;
use trend_math::optimize::{nelder_mead, NelderMeadConfig};
use trend_math::stationarity::difference;
use trend_math::stats::{mean, normal_quantile, sample_std_dev};

/// Floor on the innovation variance so flat series still score finitely
const MIN_VARIANCE: f64 = 1e-12;

/// Model order: AR order `p`, differencing `d`, MA order `q` and an optional constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    /// Mean of the differenced series (a drift term when `d == 1`)
    pub with_constant: bool,
}

impl ArimaOrder {
    /// Create a new order
    pub fn new(p: usize, d: usize, q: usize, with_constant: bool) -> Self {
        Self {
            p,
            d,
            q,
            with_constant,
        }
    }

    /// Number of estimated mean-equation parameters
    pub fn parameter_count(&self) -> usize {
        self.p + self.q + usize::from(self.with_constant)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.with_constant {
            write!(f, " with constant")?;
        }
        Ok(())
    }
}

/// ARIMA model of a fixed order
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Order to fit
    order: ArimaOrder,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    name: String,
    order: ArimaOrder,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    mean: f64,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    /// Observations contributing to the sum of squares
    nobs: usize,
    /// Last value of the series at each differencing level, undifferenced first
    level_tails: Vec<f64>,
    /// The `d`-times differenced training series
    differenced: Vec<f64>,
    /// In-sample residuals on the differenced series
    residuals: Vec<f64>,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
        }
    }

    /// Order this model fits
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model to a keyword's daily values
    pub fn fit(&self, keyword: &str, values: &[f64]) -> Result<TrainedArimaModel> {
        let ArimaOrder { p, d, q, .. } = self.order;
        let k = self.order.parameter_count();

        if values.len() <= d {
            return Err(self.fit_error(
                keyword,
                format!("{} observations cannot be differenced {d} times", values.len()),
            ));
        }

        let mut level_tails = Vec::with_capacity(d);
        let mut differenced = values.to_vec();
        for _ in 0..d {
            level_tails.push(differenced[differenced.len() - 1]);
            differenced = difference(&differenced);
        }

        // Require a few residual degrees of freedom beyond the parameters
        if differenced.len() < p + k + 3 {
            return Err(self.fit_error(
                keyword,
                format!(
                    "{} differenced observations are too few for {} parameters",
                    differenced.len(),
                    k
                ),
            ));
        }
        let nobs = differenced.len() - p;

        let objective = |params: &[f64]| {
            let (ar, ma, mu) = self.unpack(params);
            let ss = sum_of_squares(&conditional_residuals(&differenced, &ar, &ma, mu), p);
            0.5 * (ss / nobs as f64).max(MIN_VARIANCE).ln()
        };

        let (start, steps) = self.initial_simplex(&differenced);
        let config = NelderMeadConfig {
            max_iter: 1000 * k.max(1),
            x_tolerance: 1e-5,
            f_tolerance: 1e-8,
        };
        let solution = nelder_mead(objective, &start, Some(steps.as_slice()), config);

        if !solution.converged || !solution.optimal_value.is_finite() {
            return Err(self.fit_error(
                keyword,
                format!(
                    "optimiser did not converge after {} iterations",
                    solution.iterations
                ),
            ));
        }

        let (ar_coefficients, ma_coefficients, mu) = self.unpack(&solution.optimal_point);
        let residuals =
            conditional_residuals(&differenced, &ar_coefficients, &ma_coefficients, mu);
        let sigma2 = (sum_of_squares(&residuals, p) / nobs as f64).max(MIN_VARIANCE);
        let log_likelihood = -0.5 * nobs as f64 * ((2.0 * PI * sigma2).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * (k as f64 + 1.0);

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            order: self.order,
            ar_coefficients,
            ma_coefficients,
            mean: mu,
            sigma2,
            log_likelihood,
            aic,
            nobs,
            level_tails,
            differenced,
            residuals,
        })
    }

    /// Split an unconstrained parameter vector into AR, MA and mean parts
    fn unpack(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>, f64) {
        let ArimaOrder { p, q, .. } = self.order;
        let ar = partial_to_coefficients(&params[..p]);
        let ma = partial_to_coefficients(&params[p..p + q])
            .into_iter()
            .map(|c| -c)
            .collect();
        let mu = if self.order.with_constant {
            params[p + q]
        } else {
            0.0
        };
        (ar, ma, mu)
    }

    fn initial_simplex(&self, differenced: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let arma = self.order.p + self.order.q;
        let mut start = vec![0.0; arma];
        let mut steps = vec![0.1; arma];

        if self.order.with_constant {
            let centre = mean(differenced).unwrap_or(0.0);
            let spread = sample_std_dev(differenced);
            start.push(centre);
            steps.push((centre.abs() * 0.05).max(1e-3).max(0.1 * spread));
        }

        (start, steps)
    }

    fn fit_error(&self, keyword: &str, reason: String) -> ForecastError {
        ForecastError::ModelFit {
            keyword: keyword.to_string(),
            reason: format!("{}: {}", self.name, reason),
        }
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &NormalizedSeries) -> Result<TrainedArimaModel> {
        self.fit(series.keyword(), series.values())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    /// Fitted order
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Akaike information criterion of the fit
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Conditional Gaussian log-likelihood
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// AR coefficients `phi_1..phi_p`
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// MA coefficients `theta_1..theta_q`
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series (0 without a constant)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Number of observations the likelihood is conditioned on
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// In-sample residuals of the differenced series
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Point forecasts on the original scale
    fn point_forecasts(&self, horizons: usize) -> Vec<f64> {
        let n = self.differenced.len();
        let mut centred: Vec<f64> = self.differenced.iter().map(|v| v - self.mean).collect();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizons {
            let t = centred.len();
            let mut next = 0.0;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                next += phi * centred[t - 1 - i];
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                if t > j {
                    next += theta * shocks[t - 1 - j];
                }
            }
            centred.push(next);
            shocks.push(0.0);
        }

        let mut level: Vec<f64> = centred[n..].iter().map(|v| v + self.mean).collect();
        for tail in self.level_tails.iter().rev() {
            let mut running = *tail;
            level = level
                .into_iter()
                .map(|step| {
                    running += step;
                    running
                })
                .collect();
        }
        level
    }

    /// MA(infinity) weights of the integrated model, `psi_0 = 1`
    fn psi_weights(&self, horizons: usize) -> Vec<f64> {
        let mut polynomial = vec![1.0];
        polynomial.extend(self.ar_coefficients.iter().map(|phi| -phi));
        for _ in 0..self.order.d {
            let mut next = vec![0.0; polynomial.len() + 1];
            for (i, c) in polynomial.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            polynomial = next;
        }
        let integrated_ar: Vec<f64> = polynomial[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(horizons);
        psi.push(1.0);
        for j in 1..horizons {
            let mut weight = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(integrated_ar.len()) {
                weight += integrated_ar[i - 1] * psi[j - i];
            }
            psi.push(weight);
        }
        psi
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizons: usize) -> Result<ModelForecast> {
        ModelForecast::new(self.point_forecasts(horizons), horizons)
    }

    fn forecast_with_intervals(
        &self,
        horizons: usize,
        confidence_level: f64,
    ) -> Result<ModelForecast> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {confidence_level}"
            )));
        }

        let points = self.point_forecasts(horizons);
        let z = normal_quantile((1.0 + confidence_level) / 2.0)?;

        let mut cumulative = 0.0;
        let intervals = points
            .iter()
            .zip(self.psi_weights(horizons))
            .map(|(point, psi)| {
                cumulative += psi * psi;
                let half_width = z * (self.sigma2 * cumulative).sqrt();
                (point - half_width, point + half_width)
            })
            .collect();

        ModelForecast::new_with_intervals(points, horizons, intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Map partial autocorrelations `tanh(u)` to the coefficients of a stationary polynomial
fn partial_to_coefficients(raw: &[f64]) -> Vec<f64> {
    let mut coefficients: Vec<f64> = Vec::with_capacity(raw.len());
    for (k, r) in raw.iter().map(|u| u.tanh()).enumerate() {
        let previous = coefficients.clone();
        for j in 0..k {
            coefficients[j] = previous[j] - r * previous[k - 1 - j];
        }
        coefficients.push(r);
    }
    coefficients
}

/// One-step residuals of an ARMA model, zero for the first `p` observations
fn conditional_residuals(series: &[f64], ar: &[f64], ma: &[f64], mu: f64) -> Vec<f64> {
    let p = ar.len();
    let centred: Vec<f64> = series.iter().map(|v| v - mu).collect();
    let mut residuals = vec![0.0; centred.len()];

    for t in p..centred.len() {
        let mut predicted = 0.0;
        for (i, phi) in ar.iter().enumerate() {
            predicted += phi * centred[t - 1 - i];
        }
        for (j, theta) in ma.iter().enumerate() {
            if t > j {
                predicted += theta * residuals[t - 1 - j];
            }
        }
        residuals[t] = centred[t] - predicted;
    }

    residuals
}

fn sum_of_squares(residuals: &[f64], skip: usize) -> f64 {
    residuals[skip..].iter().map(|e| e * e).sum()
}
