//! Cloud credential discovery.
//!
//! # Data Flow
//! ```text
//! CredentialChain::resolve()
//!     → sources/environment.rs (AWS_ACCESS_KEY_ID, ...)
//!     → sources/profile.rs     (~/.aws/credentials)
//!     → sources/container.rs   (ECS task role endpoint)
//!     → sources/imds.rs        (EC2 instance metadata, IMDSv2)
//!     → first success wins; otherwise one aggregated CredentialError
//! ```
//!
//! # Design Decisions
//! - Sources are strategies behind one trait, tried in fixed priority order
//! - Each strategy wraps the matching `aws-config` provider
//! - A source distinguishes "not configured here" from "configured but broken"
//! - No timeout or retry at the chain level; HTTP sources carry their own timeout

pub mod chain;
pub mod sources;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_smithy_types::error::display::DisplayErrorContext;

pub use aws_credential_types::Credentials;
pub use chain::CredentialChain;

/// Why a single source produced no credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The source does not apply in this environment.
    #[error("not configured: {0}")]
    NotFound(String),

    /// The source applies but could not produce credentials.
    #[error("{0}")]
    Failed(String),
}

impl From<CredentialsError> for SourceError {
    fn from(error: CredentialsError) -> Self {
        let message = DisplayErrorContext(&error).to_string();
        match error {
            CredentialsError::CredentialsNotLoaded(_) => SourceError::NotFound(message),
            _ => SourceError::Failed(message),
        }
    }
}

/// Failure of the whole credential resolution step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Could not resolve AWS credentials: {}", render_attempts(.0))]
    Exhausted(Vec<(&'static str, SourceError)>),

    #[error("Could not build storage client: {0}")]
    Client(String),
}

fn render_attempts(attempts: &[(&'static str, SourceError)]) -> String {
    if attempts.is_empty() {
        return "no credential sources configured".to_string();
    }
    attempts
        .iter()
        .map(|(name, err)| format!("{}: {}", name, err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// One strategy for discovering credentials.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name used in logs and aggregated errors.
    fn name(&self) -> &'static str;

    /// Attempt to load credentials from this source.
    async fn load(&self) -> Result<Credentials, SourceError>;
}

/// Environment variable lookup, injectable so sources can be tested without
/// touching the process environment.
#[derive(Debug, Clone)]
pub struct Env(aws_types::os_shim_internal::Env);

impl Env {
    /// Read from the real process environment.
    pub fn process() -> Self {
        Self(aws_types::os_shim_internal::Env::real())
    }

    /// Read from a fixed map.
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        let pairs: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        Self(aws_types::os_shim_internal::Env::from_slice(&pairs))
    }

    /// Look up a variable, treating empty values as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).ok().filter(|v| !v.trim().is_empty())
    }

    /// The same lookup in the form the SDK providers accept.
    pub(crate) fn sdk(&self) -> aws_types::os_shim_internal::Env {
        self.0.clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn env(pairs: &[(&str, &str)]) -> Env {
        Env::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI", Some("FwoGZXIvYXdz".into()), None, "test");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
        assert!(!rendered.contains("FwoGZXIvYXdz"));
    }

    #[test]
    fn test_env_treats_empty_as_unset() {
        let env = env(&[("SET", "value"), ("EMPTY", "  ")]);
        assert_eq!(env.get("SET").as_deref(), Some("value"));
        assert_eq!(env.get("EMPTY"), None);
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_exhausted_error_lists_every_source() {
        let err = CredentialError::Exhausted(vec![
            ("environment", SourceError::NotFound("AWS_ACCESS_KEY_ID not set".into())),
            ("imds", SourceError::Failed("connection refused".into())),
        ]);
        assert_eq!(
            err.to_string(),
            "Could not resolve AWS credentials: environment: not configured: \
             AWS_ACCESS_KEY_ID not set; imds: connection refused"
        );
    }

    #[test]
    fn test_provider_errors_are_classified() {
        let absent = SourceError::from(CredentialsError::not_loaded("no profile file"));
        assert!(matches!(absent, SourceError::NotFound(ref m) if m.contains("no profile file")));

        let broken = SourceError::from(CredentialsError::invalid_configuration("bad role arn"));
        assert!(matches!(broken, SourceError::Failed(ref m) if m.contains("bad role arn")));
    }
}
