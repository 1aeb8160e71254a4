//! Run log: a kept temp file behind the secret-masking sink

pub mod sanitizer;

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub use sanitizer::{Sanitizer, SanitizingSink};

/// Prefix of the per-run log file
pub const LOG_FILE_PREFIX: &str = "concourse-pipeline-resource-out";

/// Env var holding the log filter; defaults to `debug`
pub const LOG_FILTER_ENV: &str = "PIPELINE_RESOURCE_LOG";

/// Create the run log in `dir`. The file is left on disk for post-mortems.
pub fn create_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    let file = tempfile::Builder::new()
        .prefix(LOG_FILE_PREFIX)
        .suffix(".log")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create log file in {}", dir.display()))?;

    let (file, path) = file.keep().map_err(|e| e.error).context("Failed to keep log file")?;
    Ok((file, path))
}

/// Subscriber writing plain-text events through `sink`
pub fn subscriber(sink: SanitizingSink<File>) -> impl tracing::Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(sink)
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Install [`subscriber`] as the global default
pub fn init(sink: SanitizingSink<File>) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(sink))
        .context("Failed to set logging subscriber")
}
