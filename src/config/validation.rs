//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, pool sizes, intervals)
//! - Validate bucket names, endpoint URLs and log levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CacheConfig → Result<(), Vec<ValidationError>>
//! - Runs after logging is up, so rejections land in the log

use std::net::SocketAddr;

use crate::config::loader::ConfigError;
use crate::config::schema::CacheConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a resolved configuration, collecting every problem found.
pub fn validate_config(config: &CacheConfig) -> Result<(), ConfigError> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}

fn collect_errors(config: &CacheConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.storage.bucket.as_deref() {
        None | Some("") => errors.push(ValidationError::new("storage.bucket", "is required")),
        Some(bucket) => {
            if let Err(message) = check_bucket_name(bucket) {
                errors.push(ValidationError::new("storage.bucket", message));
            }
        }
    }

    if config.storage.region.trim().is_empty() {
        errors.push(ValidationError::new("storage.region", "must not be empty"));
    }

    if let Some(endpoint) = &config.storage.endpoint {
        match url::Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "storage.endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "storage.endpoint",
                format!("invalid URL: {}", e),
            )),
        }
    }

    if config.storage.keep_alive_secs == 0 {
        errors.push(ValidationError::new("storage.keep_alive_secs", "must be greater than 0"));
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be greater than 0"));
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    if config.logging.level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    if config.credentials.source_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "credentials.source_timeout_secs",
            "must be greater than 0",
        ));
    }

    if !config.credentials.imds_disabled {
        if let Err(e) = url::Url::parse(&config.credentials.imds_endpoint) {
            errors.push(ValidationError::new(
                "credentials.imds_endpoint",
                format!("invalid URL: {}", e),
            ));
        }
    }

    errors
}

/// S3 bucket naming rules: 3-63 chars of lowercase letters, digits, dots and
/// hyphens, starting and ending with a letter or digit.
fn check_bucket_name(name: &str) -> Result<(), String> {
    if !(3..=63).contains(&name.len()) {
        return Err(format!("'{}' must be between 3 and 63 characters", name));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(format!("'{}' contains invalid characters", name));
    }
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return Err(format!("'{}' must start and end with a letter or digit", name));
    }
    Ok(())
}
