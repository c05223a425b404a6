//! Logging setup.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used when the configured log path is a directory.
pub const LOG_FILE_NAME: &str = "finalert.log";

/// Setup logging with the given level.
///
/// `RUST_LOG` takes precedence over `level`. When `file` is set, output is
/// also written to a daily-rolling file next to it.
///
/// # Returns
/// A guard that flushes the file writer on drop. Hold it for the lifetime
/// of the program.
pub fn setup_logging(
    level: &str,
    json: bool,
    file: Option<&Path>,
) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().pretty().boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let (dir, name) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let is_dir = path.is_dir() || path.as_os_str().to_string_lossy().ends_with('/');
    match (is_dir, path.file_name()) {
        (false, Some(name)) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            (dir.to_path_buf(), name.to_string_lossy().into_owned())
        }
        _ => (path.to_path_buf(), LOG_FILE_NAME.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("logs/finalert.log")),
            (PathBuf::from("logs"), "finalert.log".to_string())
        );
        assert_eq!(
            split_log_path(Path::new("alerts.log")),
            (PathBuf::from("."), "alerts.log".to_string())
        );
        assert_eq!(
            split_log_path(Path::new("var/log/")),
            (PathBuf::from("var/log/"), LOG_FILE_NAME.to_string())
        );
    }
}
