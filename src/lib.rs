//! # TrendPulse
//!
//! Umbrella crate for the TrendPulse workspace.
//!
//! - [`math`]: numerical building blocks (regression, stationarity, optimization, ranking)
//! - [`forecast`]: the search-interest forecasting pipeline built on top of them
//!
//! ## Example
//!
//! ```
//! use trend_pulse_workspace::forecast::utils::growth_percent;
//!
//! assert_eq!(growth_percent(50.0, 75.0), 50.0);
//! ```

pub use trend_forecast as forecast;
pub use trend_math as math;

/// Keywords tracked by a default pipeline run
pub fn default_keywords() -> Vec<String> {
    forecast::PipelineConfig::default().keywords
}
