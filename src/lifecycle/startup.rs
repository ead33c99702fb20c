//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration from command-line flags
//! - Initialize logging before anything can fail loudly
//! - Validate configuration
//! - Resolve cloud credentials into a storage client
//! - Hand the client to the server and serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried here
//! - Stages run strictly in order, never concurrently
//! - Logging precedes validation so that rejected configs are logged
//! - The storage client is moved into the server; nothing here keeps it

use async_trait::async_trait;

use crate::cli::CliArgs;
use crate::config::{self, CacheConfig, ConfigError};
use crate::credentials::CredentialError;
use crate::http::{self, ServerError};
use crate::observability;
use crate::storage::{self, StorageClient};

/// Bootstrap steps that can fail, in execution order. Logging initialization
/// runs between the first two and never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveConfig,
    ValidateConfig,
    ResolveCredentials,
    StartServer,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ResolveConfig => "resolve_config",
            Stage::ValidateConfig => "validate_config",
            Stage::ResolveCredentials => "resolve_credentials",
            Stage::StartServer => "start_server",
        };
        f.write_str(name)
    }
}

/// A failed bootstrap: the stage that failed and its rendered cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BootstrapError {
    pub stage: Stage,
    pub message: String,
}

impl BootstrapError {
    fn at(stage: Stage, error: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

/// The collaborators the bootstrap sequence drives.
#[async_trait]
pub trait Stages: Send + Sync {
    fn resolve_config(&self, args: &CliArgs) -> Result<CacheConfig, ConfigError>;

    /// Best effort; must not fail the sequence.
    fn init_logging(&self, config: &CacheConfig);

    fn validate_config(&self, config: &CacheConfig) -> Result<(), ConfigError>;

    async fn resolve_credentials(&self, config: &CacheConfig) -> Result<StorageClient, CredentialError>;

    /// Serves until shutdown. Takes ownership of the storage client.
    async fn start_server(&self, storage: StorageClient, config: &CacheConfig) -> Result<(), ServerError>;
}

/// The real collaborators.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionStages;

#[async_trait]
impl Stages for ProductionStages {
    fn resolve_config(&self, args: &CliArgs) -> Result<CacheConfig, ConfigError> {
        config::resolve_config(args)
    }

    fn init_logging(&self, config: &CacheConfig) {
        observability::init_logging(config)
    }

    fn validate_config(&self, config: &CacheConfig) -> Result<(), ConfigError> {
        config::validate_config(config)
    }

    async fn resolve_credentials(&self, config: &CacheConfig) -> Result<StorageClient, CredentialError> {
        storage::connect(config).await
    }

    async fn start_server(&self, storage: StorageClient, config: &CacheConfig) -> Result<(), ServerError> {
        http::start_server(storage, config).await
    }
}

/// Run the bootstrap sequence once.
///
/// Returns only when the server stops or a stage fails; the caller turns an
/// error into a fatal report.
pub async fn run<S: Stages + ?Sized>(stages: &S, args: &CliArgs) -> Result<(), BootstrapError> {
    let config = stages
        .resolve_config(args)
        .map_err(|e| BootstrapError::at(Stage::ResolveConfig, e))?;

    stages.init_logging(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "s3cache starting");

    stages
        .validate_config(&config)
        .map_err(|e| BootstrapError::at(Stage::ValidateConfig, e))?;
    tracing::info!(
        bind_address = %config.bind_address(),
        bucket = config.storage.bucket.as_deref().unwrap_or_default(),
        region = %config.storage.region,
        "Configuration validated"
    );

    let storage = stages
        .resolve_credentials(&config)
        .await
        .map_err(|e| BootstrapError::at(Stage::ResolveCredentials, e))?;

    stages
        .start_server(storage, &config)
        .await
        .map_err(|e| BootstrapError::at(Stage::StartServer, e))
}
