//! Configuration resolution from disk and command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::schema::CacheConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration resolution and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a configuration file without validating it.
pub fn load_file(path: &Path) -> Result<CacheConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective configuration: defaults, then the config file, then flags.
///
/// Validation is a separate stage so that logging can be initialized from the
/// resolved value before any validation error is reported.
pub fn resolve_config(args: &CliArgs) -> Result<CacheConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_file(path)?,
        None => CacheConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut CacheConfig, args: &CliArgs) {
    if let Some(bucket) = &args.bucket {
        config.storage.bucket = Some(bucket.clone());
    }
    if let Some(region) = &args.region {
        config.storage.region = region.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.storage.endpoint = Some(endpoint.clone());
    }
    if let Some(host) = &args.host {
        config.listener.host = host.clone();
    }
    if let Some(port) = args.port {
        config.listener.port = port;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(file) = &args.log_file {
        config.logging.file = Some(file.clone());
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if let Some(minutes) = args.idle_minutes {
        config.cache.idle_minutes = minutes;
    }
}
