//! End-to-end batch run: load, normalize, forecast, reconcile, report

use crate::config::PipelineConfig;
use crate::data::{DataLoader, NormalizedSeries, RawSeries};
use crate::engine::{ForecastEngine, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::export;
use crate::fallback::{FallbackEstimator, FallbackResult};
use crate::normalize::SeriesNormalizer;
use crate::reconcile::{ForecastReconciler, ReconciledTable};
use crate::report::{ReportAggregator, ReportRow};
use crate::signals::{
    trend_strengths, yearly_ranking, AuxiliarySignals, TrendStrength, YearlyAverage,
};
use crate::synthetic::placeholder_series;
use crate::utils::safe_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const FINAL_TABLE_FILE: &str = "final_forecast_table.csv";
pub const TREND_STRENGTH_FILE: &str = "trend_strength.csv";
pub const YEARLY_RANKING_FILE: &str = "tech_yearly_ranking.csv";
pub const SENTIMENT_FILE: &str = "news_sentiment.csv";
pub const DASHBOARD_FILE: &str = "dashboard_master.csv";
pub const INSIGHTS_FILE: &str = "auto_insights.txt";

/// Name of a keyword's forecast file
pub fn forecast_file_name(keyword: &str) -> String {
    format!("{}_arima_forecast.csv", safe_name(keyword))
}

/// Everything a run produced, in memory
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Normalized series in keyword order
    pub series: Vec<NormalizedSeries>,
    pub forecasts: HashMap<String, ForecastResult>,
    pub fallbacks: HashMap<String, FallbackResult>,
    pub reconciled: ReconciledTable,
    pub signals: AuxiliarySignals,
    pub trend_strength: Vec<TrendStrength>,
    pub yearly_ranking: Vec<YearlyAverage>,
    pub report: Vec<ReportRow>,
    pub insights: Vec<String>,
}

/// The sequential batch pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: SeriesNormalizer,
    engine: ForecastEngine,
    fallback: FallbackEstimator,
    reconciler: ForecastReconciler,
    aggregator: ReportAggregator,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: SeriesNormalizer::new(),
            engine: ForecastEngine::new(&config),
            fallback: FallbackEstimator::new(config.fallback_window)?,
            reconciler: ForecastReconciler::new(config.volatility_window)?,
            aggregator: ReportAggregator,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run on a trends table and write every output file into `out_dir`
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        trends_table: P,
        out_dir: Q,
    ) -> Result<PipelineOutput> {
        let raw = DataLoader::read_trends_table(trends_table)?;
        let output = self.process(raw)?;
        self.write_outputs(&output, out_dir)?;
        Ok(output)
    }

    /// Run on already loaded raw series
    pub fn process(&self, raw: Vec<RawSeries>) -> Result<PipelineOutput> {
        let keywords = &self.config.keywords;
        let mut by_keyword: HashMap<String, RawSeries> = raw
            .into_iter()
            .map(|series| (series.keyword.clone(), series))
            .collect();

        for extra in by_keyword.keys().filter(|k| !keywords.contains(*k)) {
            tracing::debug!(keyword = %extra, "Ignoring untracked technology");
        }

        let latest = by_keyword
            .values()
            .filter_map(RawSeries::latest_date)
            .max()
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut series = Vec::with_capacity(keywords.len());
        for (index, keyword) in keywords.iter().enumerate() {
            let raw = match by_keyword.remove(keyword) {
                Some(raw) if !raw.is_empty() => raw,
                _ if self.config.placeholder_for_missing => placeholder_series(
                    keyword,
                    latest,
                    self.config.placeholder_seed.wrapping_add(index as u64),
                )?,
                _ => {
                    return Err(ForecastError::EmptySeries {
                        keyword: keyword.clone(),
                    })
                }
            };
            series.push(self.normalizer.normalize(&raw)?);
        }
        tracing::info!(keywords = series.len(), "Normalized all series");

        let mut forecasts = HashMap::new();
        let mut fallbacks = HashMap::new();
        for s in &series {
            match self.engine.forecast(s, self.config.horizon)? {
                Some(result) => {
                    forecasts.insert(s.keyword().to_string(), result);
                }
                None => {
                    fallbacks.insert(s.keyword().to_string(), self.fallback.estimate(s)?);
                }
            }
        }

        let series_map: HashMap<String, NormalizedSeries> = series
            .iter()
            .map(|s| (s.keyword().to_string(), s.clone()))
            .collect();
        let reconciled = self
            .reconciler
            .reconcile(keywords, &series_map, &forecasts, &fallbacks)?;

        let signals = AuxiliarySignals::compute(&series, &self.config);
        let report = self.aggregator.aggregate(&reconciled, &signals);
        let insights = self.aggregator.insights(&report);

        Ok(PipelineOutput {
            trend_strength: trend_strengths(&series),
            yearly_ranking: yearly_ranking(&series),
            series,
            forecasts,
            fallbacks,
            reconciled,
            signals,
            report,
            insights,
        })
    }

    /// Write every output file into `out_dir`, returning the paths written
    pub fn write_outputs<P: AsRef<Path>>(
        &self,
        output: &PipelineOutput,
        out_dir: P,
    ) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        let mut written = Vec::new();

        for keyword in &self.config.keywords {
            if let Some(forecast) = output.forecasts.get(keyword) {
                let path = out_dir.join(forecast_file_name(keyword));
                export::write_forecast(&path, forecast)?;
                written.push(path);
            }
        }

        let path = out_dir.join(FINAL_TABLE_FILE);
        export::write_reconciled(&path, output.reconciled.rows())?;
        written.push(path);

        let path = out_dir.join(TREND_STRENGTH_FILE);
        export::write_records(&path, &output.trend_strength)?;
        written.push(path);

        let path = out_dir.join(YEARLY_RANKING_FILE);
        export::write_records(&path, &output.yearly_ranking)?;
        written.push(path);

        let path = out_dir.join(SENTIMENT_FILE);
        export::write_records(&path, &output.signals.sentiment_rows(&self.config.keywords))?;
        written.push(path);

        let path = out_dir.join(DASHBOARD_FILE);
        export::write_report(&path, &output.report)?;
        written.push(path);

        let path = out_dir.join(INSIGHTS_FILE);
        export::write_insights(&path, &output.insights)?;
        written.push(path);

        tracing::info!(
            out_dir = %out_dir.display(),
            files = written.len(),
            "Wrote pipeline outputs"
        );
        Ok(written)
    }
}
