//! Credentials from the container credentials endpoint (ECS task roles).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::ecs::EcsCredentialsProvider;
use aws_credential_types::provider::ProvideCredentials;

use crate::credentials::{CredentialSource, Credentials, Env, SourceError};

const RELATIVE_URI_VAR: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
const FULL_URI_VAR: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";

pub struct ContainerSource {
    env: Env,
    provider: EcsCredentialsProvider,
}

impl ContainerSource {
    pub fn new(env: Env, timeout: Duration) -> Self {
        let provider = EcsCredentialsProvider::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build();
        Self { env, provider }
    }
}

#[async_trait]
impl CredentialSource for ContainerSource {
    fn name(&self) -> &'static str {
        "container"
    }

    async fn load(&self) -> Result<Credentials, SourceError> {
        if self.env.get(RELATIVE_URI_VAR).is_none() && self.env.get(FULL_URI_VAR).is_none() {
            return Err(SourceError::NotFound(format!(
                "neither {} nor {} set",
                RELATIVE_URI_VAR, FULL_URI_VAR
            )));
        }

        Ok(self.provider.provide_credentials().await?)
    }
}
