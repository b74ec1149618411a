//! # Trend Forecast
//!
//! Forecasting of search-interest trends for a fixed set of technology keywords.
//!
//! ## Features
//!
//! - Loading of trends tables and daily `ds, y` inputs with polars
//! - Normalization of ragged raw series into gap-free daily series
//! - Automatic ARIMA order selection with holdout evaluation
//! - Trend-line fallback for keywords no model converges on
//! - A ranked comparison table with growth, direction and volatility
//! - A final report joined with sentiment, trend strength and yearly averages,
//!   plus short insight statements
//!
//! ## Quick Start
//!
//! ```no_run
//! use trend_forecast::config::PipelineConfig;
//! use trend_forecast::pipeline::Pipeline;
//!
//! # fn main() -> trend_forecast::error::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run("data/trends.csv", "outputs")?;
//!
//! for row in output.reconciled.rows() {
//!     println!("{} #{}: {}%", row.keyword, row.rank, row.growth_percent);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod fallback;
pub mod logs;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod signals;
pub mod synthetic;
pub mod utils;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, NormalizedSeries, RawSeries, TimeSeriesPoint};
pub use crate::engine::{ForecastEngine, ForecastResult, HorizonPoint};
pub use crate::error::ForecastError;
pub use crate::fallback::{FallbackEstimator, FallbackResult};
pub use crate::normalize::SeriesNormalizer;
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::reconcile::{ForecastReconciler, ReconciledRow, ReconciledTable, TrendDirection};
pub use crate::report::{ReportAggregator, ReportRow};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
