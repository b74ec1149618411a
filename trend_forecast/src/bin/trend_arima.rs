use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use trend_forecast::config::{HoldoutPolicy, PipelineConfig};
use trend_forecast::data::DataLoader;
use trend_forecast::engine::ForecastEngine;
use trend_forecast::export::write_forecast;
use trend_forecast::logs::init_logs;
use trend_forecast::normalize::SeriesNormalizer;

/// Fit an automatic ARIMA model to a `ds, y` file and write its forecast
#[derive(Parser, Clone, Debug)]
struct Args {
    /// Normalized daily input
    #[arg(long, env = "TREND_INPUT", default_value = "data/forecast_input.csv")]
    input: PathBuf,

    /// Forecast output file
    #[arg(long, env = "TREND_OUT", default_value = "outputs/arima_forecast.csv")]
    out: PathBuf,

    /// Days to forecast
    #[arg(long, default_value_t = 30)]
    periods: usize,

    /// Days withheld for accuracy measurement
    #[arg(long, default_value_t = 14)]
    holdout_days: usize,

    /// Fit on the whole series
    #[arg(long)]
    no_holdout: bool,
}

fn main() -> Result<()> {
    init_logs()?;
    let args = Args::parse();

    let raw = DataLoader::read_forecast_input(&args.input)
        .with_context(|| format!("Loading {}", args.input.display()))?;
    let series = SeriesNormalizer::new().normalize(&raw)?;

    let holdout = if args.no_holdout {
        HoldoutPolicy::disabled()
    } else {
        HoldoutPolicy {
            days: args.holdout_days,
            ..HoldoutPolicy::default()
        }
    };
    let engine = ForecastEngine::new(&PipelineConfig::default()).with_holdout(holdout);

    let result = engine
        .forecast(&series, args.periods)?
        .ok_or_else(|| anyhow!("No convergent ARIMA model for {}", args.input.display()))?;

    write_forecast(&args.out, &result).context("Writing forecast")?;
    info!(
        order = %result.order,
        holdout_rmse = ?result.holdout_rmse,
        steps = result.len(),
        out = %args.out.display(),
        "Saved forecast"
    );

    Ok(())
}
