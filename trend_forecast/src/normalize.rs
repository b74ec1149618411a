//! Daily resampling of raw series

use crate::data::{NormalizedSeries, RawSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Turns ragged raw series into gap-free daily series
///
/// Rows without a date are dropped, rows are sorted by date with the later of two
/// rows on the same date winning, and the result is reindexed to every day between
/// the first and last date. Gaps take the nearest earlier value; a gap with no
/// earlier value becomes `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize one raw series
    pub fn normalize(&self, raw: &RawSeries) -> Result<NormalizedSeries> {
        let mut rows: Vec<(NaiveDate, Option<f64>)> = raw
            .points
            .iter()
            .filter_map(|p| p.date.map(|date| (date, p.value.filter(|v| v.is_finite()))))
            .collect();

        if rows.is_empty() {
            return Err(ForecastError::EmptySeries {
                keyword: raw.keyword.clone(),
            });
        }

        // Stable sort keeps insertion order within a date, so the last row wins below
        rows.sort_by_key(|(date, _)| *date);

        let start = rows[0].0;
        let end = rows[rows.len() - 1].0;
        let days = (end - start).num_days() as usize + 1;

        let mut slots: Vec<Option<f64>> = vec![None; days];
        for (date, value) in rows {
            slots[(date - start).num_days() as usize] = value;
        }

        let mut last_known: Option<f64> = None;
        let values: Vec<f64> = slots
            .into_iter()
            .map(|slot| {
                if slot.is_some() {
                    last_known = slot;
                }
                last_known.unwrap_or(0.0)
            })
            .collect();

        tracing::debug!(
            keyword = %raw.keyword,
            raw_rows = raw.len(),
            days = values.len(),
            "Normalized series"
        );

        NormalizedSeries::new(raw.keyword.clone(), start, values)
    }

    /// Normalize every raw series, stopping at the first failure
    pub fn normalize_all(&self, raw: &[RawSeries]) -> Result<Vec<NormalizedSeries>> {
        raw.iter().map(|series| self.normalize(series)).collect()
    }
}
