//! Logging goes to a daily-rolled file so it never draws over the TUI.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

const LOG_FILE_PREFIX: &str = "rentchat.log";

/// Installs the global subscriber. Keep the guard alive until exit or the
/// tail of the log is lost.
pub fn init(config: &LogConfig, default_dir: &Path) -> Result<WorkerGuard, AppError> {
    let dir = config.dir.as_deref().unwrap_or(default_dir);
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(&config.level))
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(guard)
}

/// `RUST_LOG` overrides the configured level.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
