//! Tracing subscriber setup for the binaries

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;
use crate::context_error::{ContextError, Result};

/// Initialize the logging system
///
/// `RUST_LOG` overrides `config.level`. When `config.file` is set, output goes
/// to that file through a non-blocking writer; keep the returned guard alive
/// for the lifetime of the process so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the level directive is invalid, the log file path has no
/// file name, or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ContextError::with_context(e, "Invalid log level"))?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let (directory, file_name) = log_file_parts(path)?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(config.file.is_none())
                    .with_writer(writer),
            )
            .try_init()
    };
    initialized.map_err(|e| ContextError::with_context(e, "Failed to initialize logging"))?;

    Ok(guard)
}

fn log_file_parts(path: &Path) -> Result<(PathBuf, OsString)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| crate::context_error!("Log file path has no file name: {}", path.display()))?;
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Ok((directory, file_name.to_os_string()))
}
