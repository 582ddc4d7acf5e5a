//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout only ever carries results. `--log-file`
//! moves them to a file written from a background thread.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogLevel};

/// Environment variable holding the default log level.
pub const LOG_LEVEL_ENV: &str = "MDSEARCH_LOG_LEVEL";

/// Keeps the file writer alive; logs are flushed when it drops.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Builds the filter: `RUST_LOG` when set, otherwise the effective level.
pub fn build_filter(level: LogLevel) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level.as_filter_str())
    }
}

/// Installs the global subscriber for this process.
pub fn init(cli: &Cli) -> Result<LogGuard> {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(cli.effective_log_level(env_level.as_deref()));

    match &cli.log_file {
        Some(path) => init_file(path, filter),
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(LogGuard { _guard: None })
        }
    }
}

fn init_file(path: &Path, filter: EnvFilter) -> Result<LogGuard> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .init();

    Ok(LogGuard {
        _guard: Some(guard),
    })
}
