//! Linear trend fitting
//!
//! Ordinary least squares of value against a zero-based integer time index,
//! the basis of the deterministic fallback forecast and of trend slopes.

use crate::{MathError, Result};

/// A least-squares line `value = slope * t + intercept` with `t = 0, 1, ..., len - 1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    slope: f64,
    intercept: f64,
    len: usize,
}

impl LinearTrend {
    /// Fit a line through every value, indexed from zero
    ///
    /// A single observation yields a flat line through that value.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a trend line to an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Trend line input contains non-finite values".to_string(),
            ));
        }

        if values.len() == 1 {
            return Ok(Self {
                slope: 0.0,
                intercept: values[0],
                len: 1,
            });
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self {
            slope,
            intercept,
            len: values.len(),
        })
    }

    /// Fit a line through the most recent `window` values (or all of them if fewer)
    pub fn fit_tail(values: &[f64], window: usize) -> Result<Self> {
        if window == 0 {
            return Err(MathError::InvalidInput(
                "Trend window must be greater than zero".to_string(),
            ));
        }
        let start = values.len().saturating_sub(window);
        Self::fit(&values[start..])
    }

    /// Evaluate the line at time index `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }

    /// Predict the value `periods_ahead` steps past the last fitted index
    pub fn forecast(&self, periods_ahead: usize) -> f64 {
        let t = (self.len - 1 + periods_ahead) as f64;
        self.value_at(t)
    }

    /// Slope per time step
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Value of the line at index zero
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Number of observations the line was fitted on
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a fitted line has at least one observation
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_line_extrapolates_one_step() {
        let trend = LinearTrend::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        assert_relative_eq!(trend.slope(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(trend.intercept(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(trend.forecast(1), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_observation_is_flat() {
        let trend = LinearTrend::fit(&[42.0]).unwrap();

        assert_eq!(trend.slope(), 0.0);
        assert_eq!(trend.forecast(1), 42.0);
    }

    #[test]
    fn test_empty_series_is_rejected() {
        assert!(matches!(
            LinearTrend::fit(&[]),
            Err(MathError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_tail_uses_only_recent_window() {
        // Flat history followed by a rising tail
        let mut values = vec![50.0; 20];
        values.extend([10.0, 12.0, 14.0, 16.0]);

        let trend = LinearTrend::fit_tail(&values, 4).unwrap();
        assert_eq!(trend.len(), 4);
        assert_relative_eq!(trend.slope(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(trend.forecast(1), 18.0, epsilon = 1e-12);

        // Window larger than the series uses everything
        let all = LinearTrend::fit_tail(&values[..3], 60).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        assert!(LinearTrend::fit(&[1.0, f64::NAN, 3.0]).is_err());
    }
}
