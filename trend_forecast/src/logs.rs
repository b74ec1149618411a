use crate::error::{ForecastError, Result};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;

/// Install the JSON log subscriber; `RUST_LOG` overrides the default `info` level
pub fn init_logs() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::Subscriber::builder()
        .json()
        .flatten_event(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ForecastError::InvalidParameter(format!("Log subscriber already set: {e}")))
}
