//! Core types and utilities for the trade-admin console

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, LoggingConfig, SessionConfig, is_valid_storage_key};
pub use error::{Error, Result};
pub use types::{BearerToken, Credentials, Identity};

/// Keeps a file writer flushing until dropped
pub type LogGuard = tracing_appender::non_blocking::WorkerGuard;

/// Initialize the logging system
///
/// `RUST_LOG` wins over the configured level. When `logging.file` is set the
/// output goes to that file and the returned guard must be held until exit.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the log file
/// path has no file name.
pub fn init_logging(logging: &LoggingConfig) -> Result<Option<LogGuard>> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let json = logging.format.eq_ignore_ascii_case("json");

    let (writer, guard) = match &logging.file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::validation("logging.file", "must name a file"))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(writer).with_target(false))
            .try_init()
    };

    result.map_err(|e| Error::Other(format!("failed to install tracing subscriber: {e}")))?;
    Ok(guard)
}
