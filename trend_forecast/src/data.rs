//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Column names of the trends source table
pub const DATE_COLUMN: &str = "Date";
pub const TECHNOLOGY_COLUMN: &str = "Technology";
pub const INTEREST_COLUMN: &str = "Interest";

/// Column names of the normalized daily input
pub const DS_COLUMN: &str = "ds";
pub const Y_COLUMN: &str = "y";

/// One row of a raw series: the date may be unparseable and the value missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
}

/// A dated value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Series as delivered by the collector: possibly unsorted, duplicated, gappy or sparse
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub keyword: String,
    pub points: Vec<RawObservation>,
}

impl RawSeries {
    /// Create an empty raw series for a keyword
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            points: Vec::new(),
        }
    }

    /// Build a raw series from fully known dated values
    pub fn from_points<I>(keyword: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self {
            keyword: keyword.into(),
            points: points
                .into_iter()
                .map(|(date, value)| RawObservation {
                    date: Some(date),
                    value: Some(value),
                })
                .collect(),
        }
    }

    /// Append one observation
    pub fn push(&mut self, date: Option<NaiveDate>, value: Option<f64>) {
        self.points.push(RawObservation { date, value });
    }

    /// Number of rows, valid or not
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no rows
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Latest parseable date in the series
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.points.iter().filter_map(|p| p.date).max()
    }
}

/// A gap-free daily series with no missing values
///
/// Day `i` of the series is `start_date() + i days`, so consecutive dates always
/// differ by exactly one day. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    keyword: String,
    start: NaiveDate,
    values: Vec<f64>,
}

impl NormalizedSeries {
    /// Build a series from a start date and one finite value per consecutive day
    pub fn new(keyword: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let keyword = keyword.into();
        if values.is_empty() {
            return Err(ForecastError::EmptySeries { keyword });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Normalized series for '{keyword}' contains missing or non-finite values"
            )));
        }
        Ok(Self {
            keyword,
            start,
            values,
        })
    }

    /// Keyword this series tracks
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// First calendar day covered
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day covered
    pub fn end_date(&self) -> NaiveDate {
        self.date_at(self.values.len() - 1)
    }

    /// Calendar day of the `index`-th value
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// Daily values, oldest first
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Most recent value
    pub fn last_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Number of days covered
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for API symmetry with collections
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dated points, oldest first
    pub fn points(&self) -> Vec<TimeSeriesPoint> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint {
                date: self.date_at(i),
                value,
            })
            .collect()
    }

    /// Split off the last `tail` days
    ///
    /// Returns the leading part as its own series plus the withheld values, or `None`
    /// when the split would leave either side empty.
    pub fn split_tail(&self, tail: usize) -> Option<(NormalizedSeries, &[f64])> {
        if tail == 0 || tail >= self.values.len() {
            return None;
        }
        let cut = self.values.len() - tail;
        let head = NormalizedSeries {
            keyword: self.keyword.clone(),
            start: self.start,
            values: self.values[..cut].to_vec(),
        };
        Some((head, &self.values[cut..]))
    }

    /// View the series as raw input again
    pub fn to_raw(&self) -> RawSeries {
        RawSeries::from_points(
            self.keyword.clone(),
            self.points().into_iter().map(|p| (p.date, p.value)),
        )
    }
}

/// Parse the date shapes produced by spreadsheet exports and the trends collector
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Data loader for the pipeline's tabular inputs
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the `Date, Technology, Interest` table as one raw series per technology
    ///
    /// Series appear in the order their technology first appears in the file.
    pub fn read_trends_table<P: AsRef<Path>>(path: P) -> Result<Vec<RawSeries>> {
        let path = path.as_ref();
        let df = Self::read_csv(path)?;
        Self::require_columns(&df, &[DATE_COLUMN, TECHNOLOGY_COLUMN, INTEREST_COLUMN], path)?;

        let dates = Self::string_column(&df, DATE_COLUMN)?;
        let technologies = Self::string_column(&df, TECHNOLOGY_COLUMN)?;
        let interest = Self::float_column(&df, INTEREST_COLUMN)?;

        let mut series: Vec<RawSeries> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for ((date, technology), value) in dates.into_iter().zip(technologies).zip(interest) {
            let Some(technology) = technology.map(|t| t.trim().to_string()) else {
                continue;
            };
            if technology.is_empty() {
                continue;
            }
            let slot = *index.entry(technology.clone()).or_insert_with(|| {
                series.push(RawSeries::new(technology));
                series.len() - 1
            });
            series[slot].push(date.as_deref().and_then(parse_date), value);
        }

        tracing::info!(
            path = %path.display(),
            rows = df.height(),
            technologies = series.len(),
            "Loaded trends table"
        );
        Ok(series)
    }

    /// Load a `Date, Interest` table
    ///
    /// When `keyword` is given and the file has a `Technology` column, only that
    /// technology's rows are kept. The series is named after the keyword, or the
    /// file stem when no keyword is given.
    pub fn read_interest_file<P: AsRef<Path>>(path: P, keyword: Option<&str>) -> Result<RawSeries> {
        let path = path.as_ref();
        let df = Self::read_csv(path)?;
        Self::require_columns(&df, &[DATE_COLUMN, INTEREST_COLUMN], path)?;

        let dates = Self::string_column(&df, DATE_COLUMN)?;
        let interest = Self::float_column(&df, INTEREST_COLUMN)?;
        let technologies = match keyword {
            Some(_) if Self::has_column(&df, TECHNOLOGY_COLUMN) => {
                Some(Self::string_column(&df, TECHNOLOGY_COLUMN)?)
            }
            _ => None,
        };

        let name = keyword
            .map(str::to_string)
            .unwrap_or_else(|| Self::file_stem(path));
        let mut series = RawSeries::new(name);

        for (i, (date, value)) in dates.into_iter().zip(interest).enumerate() {
            if let (Some(wanted), Some(column)) = (keyword, technologies.as_ref()) {
                if column[i].as_deref().map(str::trim) != Some(wanted) {
                    continue;
                }
            }
            series.push(date.as_deref().and_then(parse_date), value);
        }

        Ok(series)
    }

    /// Load a normalized `ds, y` table, named after the file stem
    pub fn read_forecast_input<P: AsRef<Path>>(path: P) -> Result<RawSeries> {
        let path = path.as_ref();
        let df = Self::read_csv(path)?;
        Self::require_columns(&df, &[DS_COLUMN, Y_COLUMN], path)?;

        let dates = Self::string_column(&df, DS_COLUMN)?;
        let values = Self::float_column(&df, Y_COLUMN)?;

        let mut series = RawSeries::new(Self::file_stem(path));
        for (date, value) in dates.into_iter().zip(values) {
            series.push(date.as_deref().and_then(parse_date), value);
        }
        Ok(series)
    }

    /// Read a CSV file with a header row, trimming whitespace around column names
    fn read_csv(path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        let mut df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        df.set_column_names(&trimmed)?;

        Ok(df)
    }

    fn has_column(df: &DataFrame, column: &str) -> bool {
        df.get_column_names().iter().any(|name| *name == column)
    }

    /// Fail with `MissingRequiredColumn` naming the first absent column
    fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
        for column in columns {
            if !Self::has_column(df, column) {
                return Err(ForecastError::MissingRequiredColumn {
                    column: column.to_string(),
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// Helper method to get a column as optional strings
    fn string_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
        let series = df.column(column)?.cast(&DataType::Utf8)?;
        let values = series.utf8()?;
        Ok(values
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }

    /// Helper method to get a column as optional f64 values; unparseable cells are missing
    fn float_column(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
        let series = df.column(column)?.cast(&DataType::Float64)?;
        let values = series.f64()?;
        Ok(values
            .into_iter()
            .map(|value| value.filter(|v| v.is_finite()))
            .collect())
    }

    fn file_stem(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "series".to_string())
    }
}
