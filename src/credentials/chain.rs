//! Ordered chain of credential sources.

use std::time::Duration;

use crate::config::CredentialsConfig;
use crate::credentials::sources::{
    ContainerSource, EnvironmentSource, InstanceMetadataSource, ProfileFileSource,
};
use crate::credentials::{CredentialError, CredentialSource, Credentials, Env};

/// Tries each source in priority order; the first success wins.
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    /// Build a chain from explicit sources, highest priority first.
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// The standard chain: environment, shared credentials file, container
    /// endpoint, instance metadata.
    pub fn from_config(config: &CredentialsConfig, env: Env) -> Result<Self, CredentialError> {
        let timeout = Duration::from_secs(config.source_timeout_secs);

        let mut sources: Vec<Box<dyn CredentialSource>> = vec![
            Box::new(EnvironmentSource::new(env.clone())),
            Box::new(ProfileFileSource::new(env.clone(), config.profile.clone())),
            Box::new(ContainerSource::new(env.clone(), timeout)),
        ];

        if config.imds_disabled {
            tracing::debug!("Instance metadata credential source disabled by configuration");
        } else {
            sources.push(Box::new(InstanceMetadataSource::new(
                env,
                &config.imds_endpoint,
                timeout,
            )?));
        }

        Ok(Self::new(sources))
    }

    /// Names of the configured sources, in order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Walk the chain once.
    pub async fn resolve(&self) -> Result<Credentials, CredentialError> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.load().await {
                Ok(credentials) => {
                    tracing::info!(
                        provider = source.name(),
                        access_key_id = %credentials.access_key_id(),
                        temporary = credentials.session_token().is_some(),
                        "Resolved AWS credentials"
                    );
                    return Ok(credentials);
                }
                Err(e) => {
                    tracing::debug!(provider = source.name(), reason = %e, "Credential source skipped");
                    attempts.push((source.name(), e));
                }
            }
        }

        Err(CredentialError::Exhausted(attempts))
    }
}
