//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, paths};

/// Environment variable holding a filter directive that overrides the config.
pub const LOG_ENV: &str = "FOCUS_LOG";

const LOG_FILE_NAME: &str = "focus.log";

/// Installs the global subscriber.
///
/// Returns the writer guard when logging to a file; keep it alive until
/// exit so buffered lines are flushed. Calling this twice is harmless: the
/// second install fails quietly.
///
/// # Errors
/// Returns an error if the log directory cannot be created or the filter
/// directive is invalid.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    if !config.file {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    }

    let dir = paths::logs_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init();
    Ok(Some(guard))
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    let env_value = std::env::var(LOG_ENV).ok();
    filter_from(env_value.as_deref(), &config.level)
}

/// `FOCUS_LOG` wins over the configured level when it is non-blank.
fn filter_from(env_value: Option<&str>, level: &str) -> Result<EnvFilter> {
    match env_value.map(str::trim) {
        Some(directive) if !directive.is_empty() => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid {LOG_ENV} filter: {directive}")),
        _ => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level in config: {level}")),
    }
}
