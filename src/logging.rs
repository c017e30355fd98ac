use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use std::fs::{self, File};
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Builds the run's log subscriber: one layer to the console (stderr) and one to the
/// configured log file.
///
/// The log file is truncated on every run. `RUST_LOG` takes precedence over the
/// configured `log_level` when set.
///
/// # Errors
///
/// Returns `IoError` if the log file cannot be created and `InvalidInput` if the
/// level directive does not parse.
pub fn build_subscriber(config: &ResolvedConfig) -> AppResult<impl Subscriber + Send + Sync> {
    if let Some(parent) = config.log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(&config.log_file).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create log file {}: {e}",
            config.log_file.display()
        ))
    })?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            AppError::InvalidInput(format!("Invalid log level '{}': {e}", config.log_level))
        })?,
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        ))
}

/// Installs the subscriber for the whole process. Call once, at startup.
pub fn init(config: &ResolvedConfig) -> AppResult<()> {
    let subscriber = build_subscriber(config)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::InvalidInput(format!("Logging already initialized: {e}")))
}
