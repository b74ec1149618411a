use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use trend_forecast::data::DataLoader;
use trend_forecast::export::write_series;
use trend_forecast::logs::init_logs;
use trend_forecast::normalize::SeriesNormalizer;

/// Normalize a `Date, Interest` table into a gap-free daily `ds, y` file
#[derive(Parser, Clone, Debug)]
struct Args {
    /// Raw interest table
    #[arg(long, env = "TREND_INPUT")]
    input: PathBuf,

    /// Normalized output file
    #[arg(long, env = "TREND_OUT", default_value = "data/forecast_input.csv")]
    out: PathBuf,

    /// Keep only this technology when the table has a `Technology` column
    #[arg(long)]
    keyword: Option<String>,

    /// Days withheld into `forecast_input_holdout.csv`
    #[arg(long, default_value_t = 14)]
    holdout_days: usize,

    /// Write the whole series to `--out`
    #[arg(long)]
    no_holdout: bool,
}

fn main() -> Result<()> {
    init_logs()?;
    let args = Args::parse();

    let raw = DataLoader::read_interest_file(&args.input, args.keyword.as_deref())
        .with_context(|| format!("Loading {}", args.input.display()))?;
    let series = SeriesNormalizer::new()
        .normalize(&raw)
        .with_context(|| format!("Normalizing {}", args.input.display()))?;

    let split = if args.no_holdout || args.holdout_days == 0 {
        None
    } else {
        series.split_tail(args.holdout_days)
    };

    match split {
        Some((training, _)) => {
            let holdout_path = args.out.with_file_name("forecast_input_holdout.csv");
            let holdout_start = training.len();
            let holdout = trend_forecast::NormalizedSeries::new(
                series.keyword(),
                series.date_at(holdout_start),
                series.values()[holdout_start..].to_vec(),
            )?;

            write_series(&args.out, &training).context("Writing training series")?;
            write_series(&holdout_path, &holdout).context("Writing holdout series")?;
            info!(
                train_rows = training.len(),
                holdout_rows = holdout.len(),
                out = %args.out.display(),
                holdout = %holdout_path.display(),
                "Saved training and holdout series"
            );
        }
        None => {
            write_series(&args.out, &series).context("Writing series")?;
            info!(
                rows = series.len(),
                out = %args.out.display(),
                "No holdout created; saved full series"
            );
        }
    }

    Ok(())
}
