//! Placeholder series for keywords the collector returned nothing for

use crate::data::RawSeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use trend_math::stats::round_to;

/// Number of monthly points in a placeholder
pub const PLACEHOLDER_MONTHS: usize = 36;

/// Last calendar day of a month
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

/// The `count` month-end dates up to and including the last one on or before `end`
pub fn month_ends(end: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let (mut year, mut month) = (end.year(), end.month());
    if month_end(year, month).map_or(false, |last| last > end) {
        (year, month) = previous_month(year, month);
    }

    let mut dates = Vec::with_capacity(count);
    for _ in 0..count {
        if let Some(date) = month_end(year, month) {
            dates.push(date);
        }
        (year, month) = previous_month(year, month);
    }
    dates.reverse();
    dates
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// A sparse monthly series rising from 1 to 3 with Gaussian noise
///
/// Values are rounded to two decimals; the same seed always yields the same series.
pub fn placeholder_series(keyword: &str, end: NaiveDate, seed: u64) -> Result<RawSeries> {
    let noise = Normal::new(0.0, 0.5)
        .map_err(|e| ForecastError::InvalidParameter(format!("Placeholder noise: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let dates = month_ends(end, PLACEHOLDER_MONTHS);
    let last = dates.len().saturating_sub(1).max(1) as f64;

    let series = RawSeries::from_points(
        keyword,
        dates.into_iter().enumerate().map(|(i, date)| {
            let base = 1.0 + 2.0 * i as f64 / last;
            (date, round_to(base + noise.sample(&mut rng), 2))
        }),
    );

    tracing::warn!(
        keyword,
        points = series.len(),
        end = %end,
        "Synthesised placeholder series"
    );
    Ok(series)
}
