//! Sample statistics used across the pipeline
//!
//! Standard deviations follow the sample (n - 1) convention, so a single
//! observation has an undefined (NaN) deviation.

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().mean())
    }
}

/// Sample standard deviation; NaN with fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    values.iter().std_dev()
}

/// Sample standard deviation of every full window of `window` consecutive values
///
/// Returns `len - window + 1` values, or nothing if the series is shorter than the window.
pub fn rolling_std_dev(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values.windows(window).map(sample_std_dev).collect()
}

/// Volatility of the most recent `window` observations
///
/// Series longer than the window use only the trailing window; shorter ones use every value.
pub fn tail_volatility(values: &[f64], window: usize) -> f64 {
    if window > 0 && values.len() > window {
        sample_std_dev(&values[values.len() - window..])
    } else {
        sample_std_dev(values)
    }
}

/// Root mean squared error between a forecast and the observed values
pub fn root_mean_squared_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(MathError::InvalidInput(format!(
            "Forecast ({}) and actual ({}) values must have the same non-zero length",
            forecast.len(),
            actual.len()
        )));
    }

    let mse = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (a - f).powi(2))
        .sum::<f64>()
        / forecast.len() as f64;

    Ok(mse.sqrt())
}

/// Quantile of the standard normal distribution at probability `p`
pub fn normal_quantile(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Probability must be in (0, 1), got {p}"
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(format!("Standard normal: {e}")))?;
    Ok(normal.inverse_cdf(p))
}

/// Round half away from zero to `decimals` places; NaN stays NaN
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_std_dev() {
        // Sample variance of 2,4,4,4,5,5,7,9 is 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(
            sample_std_dev(&values),
            (32.0f64 / 7.0).sqrt(),
            epsilon = 1e-12
        );
        assert!(sample_std_dev(&[3.0]).is_nan());
    }

    #[test]
    fn test_rolling_std_dev_window_count() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let rolling = rolling_std_dev(&values, 4);
        assert_eq!(rolling.len(), 7);
        // Every window of 4 consecutive integers has the same spread
        for v in &rolling {
            assert_relative_eq!(*v, rolling[0], epsilon = 1e-12);
        }
        assert!(rolling_std_dev(&values[..3], 4).is_empty());
    }

    #[test]
    fn test_tail_volatility_uses_last_window() {
        let mut values = vec![0.0, 100.0, 0.0, 100.0];
        values.extend([5.0; 7]);
        assert_eq!(tail_volatility(&values, 7), 0.0);

        let short = [1.0, 2.0, 3.0];
        assert_relative_eq!(tail_volatility(&short, 7), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rmse() {
        let rmse = root_mean_squared_error(&[1.0, 2.0], &[2.0, 4.0]).unwrap();
        assert_relative_eq!(rmse, (2.5f64).sqrt(), epsilon = 1e-12);
        assert!(root_mean_squared_error(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_normal_quantile() {
        assert_relative_eq!(normal_quantile(0.975).unwrap(), 1.959964, epsilon = 1e-5);
        assert!(normal_quantile(1.0).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.34567, 3), 12.346);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert!(round_to(f64::NAN, 3).is_nan());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
