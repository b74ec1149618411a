//! Utility functions for the trend_forecast crate

use chrono::{Duration, NaiveDate};

/// Consecutive calendar days starting the day after `last_date`
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|step| last_date + Duration::days(step as i64))
        .collect()
}

/// File-system friendly form of a keyword: every non-alphanumeric character becomes `_`
pub fn safe_name(keyword: &str) -> String {
    keyword
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Percentage change from `current` to `forecast`; NaN when `current` is zero
pub fn growth_percent(current: f64, forecast: f64) -> f64 {
    if current == 0.0 {
        f64::NAN
    } else {
        (forecast - current) / current * 100.0
    }
}
