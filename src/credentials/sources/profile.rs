//! Credentials from the shared credentials file (`~/.aws/credentials`).

use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::ProvideCredentials;

use crate::credentials::{CredentialSource, Credentials, Env, SourceError};

const CREDENTIALS_FILE_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";
const PROFILE_VAR: &str = "AWS_PROFILE";
const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone)]
pub struct ProfileFileSource {
    env: Env,
    profile: Option<String>,
}

impl ProfileFileSource {
    /// `profile` overrides `AWS_PROFILE`.
    pub fn new(env: Env, profile: Option<String>) -> Self {
        Self { env, profile }
    }

    fn credentials_path(&self) -> Option<PathBuf> {
        self.env
            .get(CREDENTIALS_FILE_VAR)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")))
    }

    fn profile_name(&self) -> String {
        self.profile
            .clone()
            .or_else(|| self.env.get(PROFILE_VAR))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }
}

#[async_trait]
impl CredentialSource for ProfileFileSource {
    fn name(&self) -> &'static str {
        "profile"
    }

    async fn load(&self) -> Result<Credentials, SourceError> {
        let path = self
            .credentials_path()
            .ok_or_else(|| SourceError::NotFound("no home directory".into()))?;

        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(SourceError::NotFound(format!("{} does not exist", path.display())));
            }
            Err(e) => {
                return Err(SourceError::Failed(format!("could not read {}: {}", path.display(), e)));
            }
        }

        let profile = self.profile_name();
        tracing::debug!(path = %path.display(), profile = %profile, "Reading shared credentials file");

        let provider = ProfileFileCredentialsProvider::builder()
            .profile_files(
                ProfileFiles::builder()
                    .with_file(ProfileFileKind::Credentials, path)
                    .build(),
            )
            .profile_name(profile)
            .build();

        Ok(provider.provide_credentials().await?)
    }
}
