//! Process-wide tracing setup.
//!
//! Console output goes to stderr (stdout carries the stdio transport) at INFO,
//! overridable with `RUST_LOG`. A second layer writes DEBUG and above to a
//! fresh timestamped file under the configured log directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LogConfig;

/// Noisy HTTP internals are capped at INFO even in the debug file.
const FILE_FILTER: &str = "debug,hyper=info,hyper_util=info,h2=info,reqwest=info,tower=info";

/// `mcp_server_<YYYYmmdd_HHMMSS>.log` inside `dir`.
pub fn log_file_path(dir: &Path, now: chrono::DateTime<chrono::Local>) -> PathBuf {
    dir.join(format!("mcp_server_{}.log", now.format("%Y%m%d_%H%M%S")))
}

fn open_log_file(dir: &Path) -> std::io::Result<(PathBuf, File)> {
    fs::create_dir_all(dir)?;
    let path = log_file_path(dir, chrono::Local::now());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global subscriber. Returns the log file path when one was opened.
///
/// Calling this twice is harmless; the second call keeps the first subscriber.
pub fn init_logging(config: &LogConfig) -> Option<PathBuf> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file_layer, log_path, open_error) = match open_log_file(&config.dir) {
        Ok((path, file)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(path), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
    {
        tracing::warn!(error = %err, "tracing already initialized; skipping log setup");
        return None;
    }

    match (&log_path, open_error) {
        (Some(path), _) => tracing::debug!(path = %path.display(), "Writing debug log file"),
        (None, Some(e)) => tracing::warn!(
            dir = %config.dir.display(),
            error = %e,
            "Could not open log file, logging to console only"
        ),
        (None, None) => {}
    }

    log_path
}
