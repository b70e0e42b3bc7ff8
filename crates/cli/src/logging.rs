use anyhow::{anyhow, Result};
use plancast_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays a clean command payload.
pub fn init(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|error| anyhow!("invalid log filter `{}`: {error}", config.logging.level))?;
    let builder =
        tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).with_env_filter(filter);

    match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!(error))
}

/// Falls back to the default logging settings when the config itself fails to load; the
/// command reports that failure on its own.
pub fn init_from_options(options: &LoadOptions) -> Result<()> {
    let config = AppConfig::load(options.clone()).unwrap_or_default();
    init(&config)
}
