//! Log output for the world server: stderr always, a log file on request.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_PREFIX: &str = "worldserver.log";

/// Platform cache directory for server logs.
///
/// - macOS: `~/Library/Caches/worldserver/logs`
/// - Linux: `~/.cache/worldserver/logs` (or `$XDG_CACHE_HOME/worldserver/logs`)
/// - Windows: `%LOCALAPPDATA%\worldserver\cache\logs`
/// - Fallback: `./logs`
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "worldserver")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` selects levels (default `info`). With `log_dir` set, events are
/// also written to a daily-rolled file there; keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/{}", dir.display(), LOG_FILE_PREFIX);
    }

    Ok(guard)
}
