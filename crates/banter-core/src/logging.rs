//! Logging setup.
//!
//! The TUI owns the terminal, so log output goes to a file under
//! `${BANTER_HOME}/logs` instead of stderr. `RUST_LOG` controls the filter.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber writing to `<home>/logs/banter.log`.
///
/// Returns a guard that must be kept alive for the duration of the process;
/// dropping it flushes and stops the background writer.
pub fn init_logging(home: &Path) -> Result<WorkerGuard> {
    let log_dir = home.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "banter.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banter=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
