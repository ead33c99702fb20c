//! Credentials from the EC2 instance metadata service (IMDSv2).
//!
//! ```text
//! PUT  /latest/api/token                           → session token
//! GET  /latest/meta-data/iam/security-credentials/ → role name
//! GET  /latest/meta-data/iam/security-credentials/<role> → credentials JSON
//! ```

use std::time::Duration;

use async_trait::async_trait;
use aws_config::imds;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_credential_types::provider::ProvideCredentials;

use crate::credentials::{CredentialError, CredentialSource, Credentials, Env, SourceError};

const DISABLED_VAR: &str = "AWS_EC2_METADATA_DISABLED";

pub struct InstanceMetadataSource {
    env: Env,
    provider: ImdsCredentialsProvider,
}

impl InstanceMetadataSource {
    /// One attempt per request: off EC2 the link-local address never answers.
    pub fn new(env: Env, endpoint: &str, timeout: Duration) -> Result<Self, CredentialError> {
        let client = imds::Client::builder()
            .endpoint(endpoint)
            .map_err(|e| CredentialError::Client(format!("invalid metadata endpoint {}: {}", endpoint, e)))?
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .max_attempts(1)
            .build();

        let provider = ImdsCredentialsProvider::builder().imds_client(client).build();
        Ok(Self { env, provider })
    }
}

#[async_trait]
impl CredentialSource for InstanceMetadataSource {
    fn name(&self) -> &'static str {
        "imds"
    }

    async fn load(&self) -> Result<Credentials, SourceError> {
        if self
            .env
            .get(DISABLED_VAR)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Err(SourceError::NotFound(format!("disabled by {}", DISABLED_VAR)));
        }

        Ok(self.provider.provide_credentials().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::tests::env;
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, put},
        Router,
    };

    const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
    const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn check_token(headers: &HeaderMap) -> Result<(), StatusCode> {
        match headers.get(TOKEN_HEADER) {
            Some(v) if v == "imds-token" => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    fn metadata_router() -> Router {
        Router::new()
            .route(
                "/latest/api/token",
                put(|headers: HeaderMap| async move {
                    match headers.get(TOKEN_TTL_HEADER).cloned() {
                        Some(ttl) => Ok(([(TOKEN_TTL_HEADER, ttl)], "imds-token").into_response()),
                        None => Err(StatusCode::BAD_REQUEST),
                    }
                }),
            )
            .route(
                "/latest/meta-data/iam/security-credentials/",
                get(|headers: HeaderMap| async move { check_token(&headers).map(|_| "cache-role") }),
            )
            .route(
                "/latest/meta-data/iam/security-credentials/{role}",
                get(|Path(role): Path<String>, headers: HeaderMap| async move {
                    check_token(&headers)?;
                    if role != "cache-role" {
                        return Err(StatusCode::NOT_FOUND);
                    }
                    Ok(r#"{"Code":"Success","LastUpdated":"2029-12-31T23:00:00Z",
                           "Type":"AWS-HMAC","AccessKeyId":"ASIA_ROLE",
                           "SecretAccessKey":"SECRET_ROLE","Token":"SESSION_ROLE",
                           "Expiration":"2030-01-01T00:00:00Z"}"#)
                }),
            )
    }

    #[tokio::test]
    async fn test_role_credentials() {
        let endpoint = serve(metadata_router()).await;
        let source = InstanceMetadataSource::new(env(&[]), &endpoint, Duration::from_secs(2)).unwrap();

        let creds = source.load().await.unwrap();
        assert_eq!(creds.access_key_id(), "ASIA_ROLE");
        assert_eq!(creds.session_token(), Some("SESSION_ROLE"));
    }

    #[tokio::test]
    async fn test_disabled_by_env() {
        let source = InstanceMetadataSource::new(
            env(&[(DISABLED_VAR, "TRUE")]),
            "http://127.0.0.1:1",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = source.load().await.unwrap_err();
        assert_eq!(err, SourceError::NotFound(format!("disabled by {}", DISABLED_VAR)));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let result = InstanceMetadataSource::new(env(&[]), "not a uri", Duration::from_secs(2));
        assert!(matches!(result, Err(CredentialError::Client(_))));
    }
}
