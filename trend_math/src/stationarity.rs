//! Stationarity testing and differencing
//!
//! The differencing order of a series is chosen by repeatedly applying the KPSS
//! test for level stationarity and differencing while the null is rejected.

use crate::{MathError, Result};

/// KPSS level-stationarity critical value at the 5% significance level
pub const KPSS_LEVEL_CRITICAL_5PCT: f64 = 0.463;

/// KPSS statistic for the null hypothesis of level stationarity
///
/// Uses the short lag truncation `trunc(3 * sqrt(n) / 13)` with Bartlett weights.
pub fn kpss_level_statistic(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 3 {
        return Err(MathError::InsufficientData(format!(
            "KPSS test needs at least 3 observations, got {n}"
        )));
    }

    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let resid: Vec<f64> = values.iter().map(|v| v - mean).collect();

    let mut partial = 0.0;
    let mut eta = 0.0;
    for e in &resid {
        partial += e;
        eta += partial * partial;
    }
    eta /= nf * nf;

    let lags = (3.0 * nf.sqrt() / 13.0).trunc() as usize;
    let mut long_run = resid.iter().map(|e| e * e).sum::<f64>();
    for lag in 1..=lags.min(n - 1) {
        let weight = 1.0 - lag as f64 / (lags as f64 + 1.0);
        let autocov: f64 = resid[lag..]
            .iter()
            .zip(&resid[..n - lag])
            .map(|(a, b)| a * b)
            .sum();
        long_run += 2.0 * weight * autocov;
    }
    long_run /= nf;

    if !(long_run.is_finite() && long_run > 0.0) {
        return Err(MathError::CalculationError(
            "KPSS long-run variance is zero; series is constant".to_string(),
        ));
    }

    Ok(eta / long_run)
}

/// First difference of a series (one shorter than the input)
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Number of differences needed for level stationarity, at most `max_d`
///
/// Differencing stops early once the series is too short or constant to test.
pub fn differencing_order(values: &[f64], max_d: usize) -> usize {
    let mut current = values.to_vec();
    let mut d = 0;

    while d < max_d {
        match kpss_level_statistic(&current) {
            Ok(stat) if stat > KPSS_LEVEL_CRITICAL_5PCT => {
                current = difference(&current);
                d += 1;
            }
            _ => break,
        }
    }

    d
}
