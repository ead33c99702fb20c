//! Credentials from `AWS_*` environment variables.

use async_trait::async_trait;
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_credential_types::provider::ProvideCredentials;

use crate::credentials::{CredentialSource, Credentials, Env, SourceError};

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

pub struct EnvironmentSource {
    env: Env,
    provider: EnvironmentVariableCredentialsProvider,
}

impl EnvironmentSource {
    pub fn new(env: Env) -> Self {
        let provider = EnvironmentVariableCredentialsProvider::new_with_env(env.sdk());
        Self { env, provider }
    }
}

#[async_trait]
impl CredentialSource for EnvironmentSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    async fn load(&self) -> Result<Credentials, SourceError> {
        if self.env.get(ACCESS_KEY_ID).is_none() {
            return Err(SourceError::NotFound(format!("{} not set", ACCESS_KEY_ID)));
        }

        // A key id without its secret is a misconfiguration, not an absence.
        if self.env.get(SECRET_ACCESS_KEY).is_none() {
            return Err(SourceError::Failed(format!(
                "{} is set but {} is not",
                ACCESS_KEY_ID, SECRET_ACCESS_KEY
            )));
        }

        Ok(self.provider.provide_credentials().await?)
    }
}
