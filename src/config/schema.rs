//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the cache.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Remote object store settings.
    pub storage: StorageConfig,

    /// Local cache settings handed to the server.
    pub cache: CacheSettings,

    /// Logging sink settings.
    pub logging: LoggingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Credential discovery settings.
    pub credentials: CredentialsConfig,
}

impl CacheConfig {
    /// Address the server binds to, as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.host, self.listener.port)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind. Loopback by default: the cache serves local builds.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Maximum concurrent in-flight requests.
    pub max_connections: usize,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            max_connections: 1_000,
            request_timeout_secs: 60,
        }
    }
}

/// Remote object store configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket holding cache objects. Required.
    pub bucket: Option<String>,

    /// Region of the bucket.
    pub region: String,

    /// Custom endpoint (e.g. a MinIO instance). Defaults to AWS.
    pub endpoint: Option<String>,

    /// Keep-alive interval for pooled connections, in seconds.
    pub keep_alive_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: "us-east-1".to_string(),
            endpoint: None,
            keep_alive_secs: 60,
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of entries kept in memory.
    pub max_entries: usize,

    /// Entries larger than this are never cached locally.
    pub max_entry_size_bytes: u64,

    /// Shut down after this many minutes without requests. Zero disables.
    pub idle_minutes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_entry_size_bytes: 1024 * 1024, // 1MB
            idle_minutes: 0,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Line format.
    pub format: LogFormat,

    /// File the log is appended to. [`LOG_TO_STDERR`] or `None` logs to stderr.
    pub file: Option<String>,
}

/// `logging.file` value selecting stderr as the log sink.
pub const LOG_TO_STDERR: &str = "-";

/// `~/.s3cache.log`, or the same name in the temp dir without a home directory.
pub fn default_log_file() -> String {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".s3cache.log")
        .to_string_lossy()
        .into_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: Some(default_log_file()),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Credential discovery configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Profile in the shared credentials file. Falls back to `AWS_PROFILE`, then `default`.
    pub profile: Option<String>,

    /// Instance metadata service base URL.
    pub imds_endpoint: String,

    /// Skip the instance metadata source entirely.
    pub imds_disabled: bool,

    /// Per-request timeout for HTTP based sources, in seconds.
    pub source_timeout_secs: u64,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            profile: None,
            imds_endpoint: "http://169.254.169.254".to_string(),
            imds_disabled: false,
            source_timeout_secs: 2,
        }
    }
}
