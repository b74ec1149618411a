//! Pipeline configuration
//!
//! The tracked keyword set and the sentiment lookup are configuration values:
//! loaded once at startup (built-in defaults or a JSON file) and read-only after.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Technologies tracked when no configuration file is given
pub const DEFAULT_KEYWORDS: [&str; 5] = [
    "Generative AI",
    "Blockchain",
    "Quantum Computing",
    "Edge Computing",
    "5G",
];

/// When a trailing window is withheld from model fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldoutPolicy {
    /// Whether to reserve a holdout window at all
    pub enabled: bool,
    /// A holdout is reserved only for series strictly longer than this
    pub min_history: usize,
    /// Length of the holdout window in days
    pub days: usize,
}

impl Default for HoldoutPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_history: 30,
            days: 14,
        }
    }
}

impl HoldoutPolicy {
    /// A policy that never withholds data
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Number of trailing points to withhold from a series of `len` points
    pub fn holdout_len(&self, len: usize) -> Option<usize> {
        if self.enabled && self.days > 0 && len > self.min_history && len > self.days {
            Some(self.days)
        } else {
            None
        }
    }
}

/// Configuration for a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tracked keywords; the reconciled table has exactly one row per entry
    pub keywords: Vec<String>,
    /// Static sentiment label per keyword
    pub sentiment: BTreeMap<String, String>,
    /// Number of daily steps to forecast
    pub horizon: usize,
    /// Holdout evaluation policy
    pub holdout: HoldoutPolicy,
    /// Observations used by the trend-line fallback
    pub fallback_window: usize,
    /// Observations used for the volatility column
    pub volatility_window: usize,
    /// Two-sided confidence level of the forecast bounds
    pub confidence_level: f64,
    /// Largest autoregressive order searched
    pub max_p: usize,
    /// Largest moving-average order searched
    pub max_q: usize,
    /// Largest differencing order
    pub max_d: usize,
    /// Synthesise a placeholder series for keywords with no rows at all
    pub placeholder_for_missing: bool,
    /// Seed for placeholder noise
    pub placeholder_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let sentiment = [
            ("Generative AI", "Positive"),
            ("Blockchain", "Neutral"),
            ("Quantum Computing", "Positive"),
            ("Edge Computing", "Neutral"),
            ("5G", "Positive"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            sentiment,
            horizon: 30,
            holdout: HoldoutPolicy::default(),
            fallback_window: 60,
            volatility_window: 7,
            confidence_level: 0.95,
            max_p: 5,
            max_q: 5,
            max_d: 2,
            placeholder_for_missing: true,
            placeholder_seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one keyword must be configured".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for keyword in &self.keywords {
            if !seen.insert(keyword.as_str()) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Keyword '{keyword}' is configured more than once"
                )));
            }
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        if self.fallback_window == 0 || self.volatility_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Fallback and volatility windows must be greater than zero".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Confidence level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }

    /// Sentiment label for a keyword, if configured
    pub fn sentiment_for(&self, keyword: &str) -> Option<&str> {
        self.sentiment.get(keyword).map(String::as_str)
    }
}
