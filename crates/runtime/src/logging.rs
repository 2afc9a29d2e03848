//! Tracing subscriber setup for embedders.
//!
//! Logs go to stderr and, when a directory is configured, to a non-blocking
//! file appender as well.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Logging options.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Filter directives used when `RUST_LOG` is unset, e.g. `"info,runtime::dispatch=debug"`.
    pub filter: String,
    /// Directory for the log file; stderr only when `None`.
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_dir: None,
            file_name: "session.log".to_string(),
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Enables the file layer in the platform cache directory.
    pub fn with_default_log_dir(mut self) -> Self {
        self.log_dir = Some(default_log_dir());
        self
    }
}

/// Platform-specific log directory.
///
/// - macOS: `~/Library/Caches/game-runtime/logs`
/// - Linux: `~/.cache/game-runtime/logs` (or `$XDG_CACHE_HOME/game-runtime/logs`)
/// - Windows: `%LOCALAPPDATA%\game-runtime\logs`
/// - Fallback: `/tmp/game-runtime/logs`
pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "game-runtime")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/game-runtime"))
        .join("logs")
}

/// Installs the global subscriber.
///
/// Returns the file appender guard when a log directory is configured; the
/// file writer stops when it is dropped, so keep it alive for the life of
/// the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|source| {
            LoggingError::InvalidFilter {
                filter: config.filter.clone(),
                source,
            }
        })?,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = file_writer(dir, &config.file_name)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    if let Some(dir) = &config.log_dir {
        tracing::info!(
            target: "runtime::worker",
            path = %dir.join(&config.file_name).display(),
            "Logging initialized"
        );
    }
    Ok(guard)
}

fn file_writer(
    dir: &Path,
    file_name: &str,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_dir_ends_in_logs() {
        assert!(default_log_dir().ends_with("logs"));
    }

    #[test]
    fn invalid_filter_is_reported() {
        // Only reached when RUST_LOG does not override the configured filter.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            filter: "runtime::dispatch=loud".to_string(),
            ..LogConfig::default()
        };

        let error = init_logging(&config).unwrap_err();

        assert!(matches!(error, LoggingError::InvalidFilter { .. }));
    }
}
