//! Auxiliary per-keyword signals joined into the final report

use crate::config::PipelineConfig;
use crate::data::NormalizedSeries;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};
use trend_math::regression::LinearTrend;
use trend_math::stats::{rolling_std_dev, round_to, sample_std_dev};

/// Minimum observations before the slope term counts
const MIN_SLOPE_POINTS: usize = 5;
/// Window of the rolling volatility in the stability term
const STABILITY_WINDOW: usize = 14;

/// Momentum score of one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStrength {
    #[serde(rename = "Technology")]
    pub keyword: String,
    #[serde(rename = "Trend_Strength")]
    pub score: f64,
}

/// Mean interest of one keyword in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAverage {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Technology")]
    pub keyword: String,
    #[serde(rename = "Avg_Interest")]
    pub average: f64,
}

/// Sentiment label of one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentLabel {
    #[serde(rename = "Technology")]
    pub keyword: String,
    #[serde(rename = "News_Sentiment")]
    pub label: String,
}

/// Composite of linear slope and inverse rolling volatility, rounded to 2 decimals
///
/// `slope * 10 + stability * 50`, where the slope is zero for fewer than five
/// observations and stability is `1 / (mean 14-day rolling std + 1)`, or
/// `1 / (std + 1)` for series shorter than the window.
pub fn trend_strength_score(values: &[f64]) -> f64 {
    let slope = if values.len() >= MIN_SLOPE_POINTS {
        LinearTrend::fit(values).map(|t| t.slope()).unwrap_or(0.0)
    } else {
        0.0
    };

    let spread = if values.len() >= STABILITY_WINDOW {
        rolling_std_dev(values, STABILITY_WINDOW).iter().mean()
    } else {
        sample_std_dev(values)
    };
    let spread = if spread.is_nan() { 0.0 } else { spread };
    let stability = 1.0 / (spread + 1.0);

    round_to(slope * 10.0 + stability * 50.0, 2)
}

/// Trend strength of every series, in input order
pub fn trend_strengths(series: &[NormalizedSeries]) -> Vec<TrendStrength> {
    series
        .iter()
        .map(|s| TrendStrength {
            keyword: s.keyword().to_string(),
            score: trend_strength_score(s.values()),
        })
        .collect()
}

/// Mean interest per calendar year and keyword
///
/// Sorted by year, then by average from highest to lowest.
pub fn yearly_ranking(series: &[NormalizedSeries]) -> Vec<YearlyAverage> {
    let mut ranking = Vec::new();

    for s in series {
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for point in s.points() {
            by_year.entry(point.date.year()).or_default().push(point.value);
        }
        ranking.extend(by_year.into_iter().map(|(year, values)| YearlyAverage {
            year,
            keyword: s.keyword().to_string(),
            average: values.iter().mean(),
        }));
    }

    ranking.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| b.average.total_cmp(&a.average))
    });
    ranking
}

/// Per keyword, the mean of its yearly means
pub fn yearly_average_interest(ranking: &[YearlyAverage]) -> HashMap<String, f64> {
    let mut grouped: HashMap<&str, Vec<f64>> = HashMap::new();
    for entry in ranking {
        grouped
            .entry(entry.keyword.as_str())
            .or_default()
            .push(entry.average);
    }

    grouped
        .into_iter()
        .map(|(keyword, averages)| (keyword.to_string(), averages.iter().mean()))
        .collect()
}

/// Keyword-to-value lookups joined onto the reconciled table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliarySignals {
    pub sentiment: HashMap<String, String>,
    pub trend_strength: HashMap<String, f64>,
    pub yearly_avg_interest: HashMap<String, f64>,
}

impl AuxiliarySignals {
    /// Derive every signal from the normalized series and the configured sentiment labels
    pub fn compute(series: &[NormalizedSeries], config: &PipelineConfig) -> Self {
        let sentiment = config
            .keywords
            .iter()
            .filter_map(|keyword| {
                config
                    .sentiment_for(keyword)
                    .map(|label| (keyword.clone(), label.to_string()))
            })
            .collect();

        Self {
            sentiment,
            trend_strength: trend_strengths(series)
                .into_iter()
                .map(|t| (t.keyword, t.score))
                .collect(),
            yearly_avg_interest: yearly_average_interest(&yearly_ranking(series)),
        }
    }

    /// Sentiment lookup as exportable rows, in keyword order
    pub fn sentiment_rows(&self, keywords: &[String]) -> Vec<SentimentLabel> {
        keywords
            .iter()
            .filter_map(|keyword| {
                self.sentiment.get(keyword).map(|label| SentimentLabel {
                    keyword: keyword.clone(),
                    label: label.clone(),
                })
            })
            .collect()
    }
}
