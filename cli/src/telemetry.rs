//! Tracing subscriber setup shared by the skycast binaries.
//!
//! Logs always go to stderr; the weather server's stdout carries the MCP
//! protocol. An optional log file gets a plain-text copy.

use anyhow::{Context, Result};
use skycast_infrastructure::expand_path;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter from `RUST_LOG`, or from the `-v` count when unset.
fn filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file lines are flushed.
pub fn init(verbose: u8, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(filter(verbose))
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let path = expand_path(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(stderr_layer)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}
