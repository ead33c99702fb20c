//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide `tracing` subscriber from configuration
//! - Route log lines to an append-only log file, or to stderr on request
//!
//! # Design Decisions
//! - A file is the default sink, so stderr carries only fatal lines
//! - Best effort: a broken sink degrades to stderr, it never aborts startup
//! - `RUST_LOG` takes precedence over the configured level
//! - JSON format for machine parsing, pretty format for humans

use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{CacheConfig, LogFormat, LoggingConfig, LOG_TO_STDERR};

/// Reasons a logging sink could not be installed as configured.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not open log file {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

/// Build the filter directive for a configured level.
///
/// Our own crate and the HTTP trace layer log at the configured level,
/// everything else (hyper, the AWS SDK, ...) only at `warn`.
pub fn filter_directive(level: &str) -> String {
    format!("warn,s3cache={0},tower_http={0}", level)
}

/// Initialize the process-wide logging sink.
///
/// Never fails: problems are reported on stderr and logging falls back to a
/// stderr sink where possible.
pub fn init_logging(config: &CacheConfig) {
    if let Err(e) = try_init_logging(&config.logging) {
        eprintln!("s3cache: warning: {}", e);
    }
}

/// Fallible variant of [`init_logging`].
pub fn try_init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| EnvFilter::try_new(filter_directive(&config.level)).ok())
        .unwrap_or_else(|| EnvFilter::new(filter_directive("info")));

    let (writer, file_error) = match log_file(config) {
        Some(path) => match open_log_file(path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), None),
            Err(source) => (
                BoxMakeWriter::new(std::io::stderr),
                Some(LoggingError::OpenFile {
                    path: path.to_string(),
                    source,
                }),
            ),
        },
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };
    let to_file = log_file(config).is_some() && file_error.is_none();
    let ansi = !to_file && std::io::stderr().is_terminal();

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        file = ?config.file,
        "Logging initialized"
    );

    match file_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// The file to log to, or `None` for stderr.
fn log_file(config: &LoggingConfig) -> Option<&str> {
    config.file.as_deref().filter(|f| *f != LOG_TO_STDERR)
}

fn open_log_file(path: &str) -> Result<File, std::io::Error> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_parses() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok(), "{}", level);
        }
    }

    #[test]
    fn test_log_file_selection() {
        let mut config = LoggingConfig::default();
        assert!(log_file(&config).is_some_and(|f| f.ends_with(".s3cache.log")));

        config.file = Some(LOG_TO_STDERR.to_string());
        assert_eq!(log_file(&config), None);

        config.file = None;
        assert_eq!(log_file(&config), None);

        config.file = Some("/var/log/s3cache.log".to_string());
        assert_eq!(log_file(&config), Some("/var/log/s3cache.log"));
    }

    #[test]
    fn test_open_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s3cache.log");
        let path = path.to_str().unwrap();

        std::fs::write(path, "first\n").unwrap();
        {
            use std::io::Write;
            let mut file = open_log_file(path).unwrap();
            writeln!(file, "second").unwrap();
        }
        assert_eq!(std::fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_in_missing_dir_fails() {
        assert!(open_log_file("/nonexistent-dir/s3cache.log").is_err());
    }
}
