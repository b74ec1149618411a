//! CSV and text outputs of the pipeline
//!
//! Undefined numbers (NaN) are written as empty fields.

use crate::data::NormalizedSeries;
use crate::engine::{ForecastResult, HorizonPoint};
use crate::error::{ForecastError, Result};
use crate::reconcile::{ReconciledRow, TrendDirection};
use crate::report::ReportRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Columns of a per-keyword forecast file
pub const FORECAST_COLUMNS: [&str; 4] = ["ds", "y_pred", "y_lower", "y_upper"];

#[derive(Debug, Serialize, Deserialize)]
struct ForecastRecord {
    ds: NaiveDate,
    y_pred: f64,
    y_lower: f64,
    y_upper: f64,
}

#[derive(Debug, Serialize)]
struct SeriesRecord {
    ds: NaiveDate,
    y: f64,
}

#[derive(Debug, Serialize)]
struct ReconciledRecord<'a> {
    #[serde(rename = "Technology")]
    technology: &'a str,
    #[serde(rename = "Current_Value")]
    current_value: Option<f64>,
    #[serde(rename = "Forecast_Value")]
    forecast_value: Option<f64>,
    #[serde(rename = "Growth_Percent")]
    growth_percent: Option<f64>,
    #[serde(rename = "Trend_Direction")]
    trend_direction: TrendDirection,
    #[serde(rename = "Volatility")]
    volatility: Option<f64>,
    #[serde(rename = "Rank")]
    rank: usize,
}

impl<'a> From<&'a ReconciledRow> for ReconciledRecord<'a> {
    fn from(row: &'a ReconciledRow) -> Self {
        Self {
            technology: &row.keyword,
            current_value: defined(row.current_value),
            forecast_value: defined(row.forecast_value),
            growth_percent: defined(row.growth_percent),
            trend_direction: row.trend_direction,
            volatility: defined(row.volatility),
            rank: row.rank,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    #[serde(rename = "Technology")]
    technology: &'a str,
    #[serde(rename = "Current_Value")]
    current_value: Option<f64>,
    #[serde(rename = "Forecast_Value")]
    forecast_value: Option<f64>,
    #[serde(rename = "Growth_Percent")]
    growth_percent: Option<f64>,
    #[serde(rename = "Trend_Direction")]
    trend_direction: TrendDirection,
    #[serde(rename = "Volatility")]
    volatility: Option<f64>,
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "News_Sentiment")]
    news_sentiment: Option<&'a str>,
    #[serde(rename = "Trend_Strength")]
    trend_strength: Option<f64>,
    #[serde(rename = "Yearly_Avg_Interest")]
    yearly_avg_interest: Option<f64>,
}

fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Serialize records to a CSV file with a header row
pub fn write_records<P, T>(path: P, records: &[T]) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), rows = records.len(), "Wrote CSV");
    Ok(())
}

/// Write the `ds, y_pred, y_lower, y_upper` file of a forecast
pub fn write_forecast<P: AsRef<Path>>(path: P, forecast: &ForecastResult) -> Result<()> {
    let records: Vec<ForecastRecord> = forecast
        .horizon_points
        .iter()
        .map(|p| ForecastRecord {
            ds: p.date,
            y_pred: p.point_estimate,
            y_lower: p.lower_bound,
            y_upper: p.upper_bound,
        })
        .collect();
    write_records(path, &records)
}

/// Read a forecast file back into horizon points
pub fn read_forecast<P: AsRef<Path>>(path: P) -> Result<Vec<HorizonPoint>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    for column in FORECAST_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ForecastError::MissingRequiredColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    reader
        .deserialize::<ForecastRecord>()
        .map(|record| -> Result<HorizonPoint> {
            let record = record?;
            Ok(HorizonPoint {
                date: record.ds,
                point_estimate: record.y_pred,
                lower_bound: record.y_lower,
                upper_bound: record.y_upper,
            })
        })
        .collect()
}

/// Write a normalized series as a `ds, y` file
pub fn write_series<P: AsRef<Path>>(path: P, series: &NormalizedSeries) -> Result<()> {
    let records: Vec<SeriesRecord> = series
        .points()
        .into_iter()
        .map(|p| SeriesRecord {
            ds: p.date,
            y: p.value,
        })
        .collect();
    write_records(path, &records)
}

/// Write the ranked comparison table
pub fn write_reconciled<P: AsRef<Path>>(path: P, rows: &[ReconciledRow]) -> Result<()> {
    let records: Vec<ReconciledRecord<'_>> = rows.iter().map(ReconciledRecord::from).collect();
    write_records(path, &records)
}

/// Write the final report with its signal columns
pub fn write_report<P: AsRef<Path>>(path: P, rows: &[ReportRow]) -> Result<()> {
    let records: Vec<ReportRecord<'_>> = rows
        .iter()
        .map(|row| {
            let base = ReconciledRecord::from(&row.reconciled);
            ReportRecord {
                technology: base.technology,
                current_value: base.current_value,
                forecast_value: base.forecast_value,
                growth_percent: base.growth_percent,
                trend_direction: base.trend_direction,
                volatility: base.volatility,
                rank: base.rank,
                news_sentiment: row.sentiment_label.as_deref(),
                trend_strength: row.trend_strength_score,
                yearly_avg_interest: row.yearly_avg_interest,
            }
        })
        .collect();
    write_records(path, &records)
}

/// Write one insight per line
pub fn write_insights<P: AsRef<Path>>(path: P, lines: &[String]) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    let mut file = File::create(path)?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(())
}
