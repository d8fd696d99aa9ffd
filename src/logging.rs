//! File-backed tracing setup.
//!
//! The terminal belongs to the UI, so log output goes to a file only.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "CLUP_LOG";
const DEFAULT_FILTER: &str = "clup=info";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Default log location: `<data dir>/clup/clup.log`.
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("clup")
        .join("clup.log")
}

/// Install the global subscriber. The returned guard flushes pending
/// records when dropped and must outlive every log call.
pub fn init(path: Option<PathBuf>) -> Result<WorkerGuard, LogError> {
    let path = path.unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LogError::Open {
            path: path.clone(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LogError::Open {
            path: path.clone(),
            source,
        })?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;

    Ok(guard)
}
