use anyhow::{Context, Result, anyhow};
use core_types::config::{LogFormat, LoggingSection};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs always go to stderr so they never mix
/// with extracted content on stdout.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(cfg: &LoggingSection, format: LogFormat) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid log level {:?}", cfg.level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to install tracing subscriber")
}
