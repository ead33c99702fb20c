//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags + optional TOML file
//!     → loader.rs (read, deserialize, apply flag overrides)
//!     → [logging initialized from the resolved value]
//!     → validation.rs (semantic checks)
//!     → CacheConfig (validated, immutable)
//!     → borrowed by the credential resolver, moved into the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated
//! - All fields have defaults to allow minimal configs
//! - Resolution and validation are separate stages

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError};
pub use schema::{
    CacheConfig, CacheSettings, CredentialsConfig, ListenerConfig, LogFormat, LoggingConfig,
    ObservabilityConfig, StorageConfig, LOG_TO_STDERR,
};
pub use validation::{validate_config, ValidationError};
