use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use trend_forecast::config::PipelineConfig;
use trend_forecast::logs::init_logs;
use trend_forecast::pipeline::Pipeline;

/// Run the full pipeline on a `Date, Technology, Interest` table
#[derive(Parser, Clone, Debug)]
struct Args {
    /// Trends table
    #[arg(long, env = "TREND_INPUT", default_value = "data/all_trends.csv")]
    input: PathBuf,

    /// Output directory
    #[arg(long, env = "TREND_OUT", default_value = "outputs")]
    out: PathBuf,

    /// JSON configuration overriding the built-in keywords and settings
    #[arg(long, env = "TREND_CONFIG")]
    config: Option<PathBuf>,

    /// Days to forecast
    #[arg(long)]
    periods: Option<usize>,

    /// Days withheld for accuracy measurement
    #[arg(long)]
    holdout_days: Option<usize>,

    /// Fit on the whole series
    #[arg(long)]
    no_holdout: bool,
}

fn main() -> Result<()> {
    init_logs()?;
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(periods) = args.periods {
        config.horizon = periods;
    }
    if let Some(days) = args.holdout_days {
        config.holdout.days = days;
    }
    if args.no_holdout {
        config.holdout.enabled = false;
    }

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let output = pipeline
        .run(&args.input, &args.out)
        .with_context(|| format!("Running pipeline on {}", args.input.display()))?;

    for line in &output.insights {
        info!(insight = %line);
    }
    info!(
        keywords = output.reconciled.len(),
        fallbacks = output.fallbacks.len(),
        out = %args.out.display(),
        "Pipeline finished"
    );

    Ok(())
}
