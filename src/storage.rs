//! Storage client handle: an S3 client signed with the resolved credentials,
//! sending through a pooled keep-alive connector.
//!
//! The handle is built once at startup and moved into the server, which owns
//! it for the rest of the process.

use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_smithy_http_client::tls::{self, rustls_provider::CryptoMode};

use crate::config::{CacheConfig, StorageConfig};
use crate::credentials::{CredentialChain, CredentialError, Credentials, Env};

/// Ready-to-use connection to the bucket.
#[derive(Debug)]
pub struct StorageClient {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
    keep_alive: Duration,
}

impl StorageClient {
    /// Wrap resolved credentials into a client for the configured bucket.
    pub fn new(credentials: Credentials, config: &StorageConfig) -> Result<Self, CredentialError> {
        let bucket = config
            .bucket
            .clone()
            .ok_or_else(|| CredentialError::Client("no bucket configured".into()))?;
        let keep_alive = Duration::from_secs(config.keep_alive_secs);

        let http_client = aws_smithy_http_client::Builder::new()
            .pool_idle_timeout(keep_alive)
            .tls_provider(tls::Provider::Rustls(CryptoMode::AwsLc))
            .build_https();

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .http_client(http_client);

        let endpoint = config.endpoint.as_ref().map(|e| e.trim_end_matches('/').to_string());
        if let Some(endpoint) = &endpoint {
            // Custom endpoints (MinIO and friends) only speak path-style.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket,
            region: config.region.clone(),
            endpoint,
            keep_alive,
        })
    }

    /// Signed S3 client. Clones share one connection pool.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Custom endpoint, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// How long idle pooled connections stay open.
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }
}

/// Resolve credentials through the standard chain and build the client.
pub async fn connect(config: &CacheConfig) -> Result<StorageClient, CredentialError> {
    let chain = CredentialChain::from_config(&config.credentials, Env::process())?;
    tracing::debug!(sources = ?chain.source_names(), "Resolving AWS credentials");

    let credentials = chain.resolve().await?;
    let client = StorageClient::new(credentials, &config.storage)?;

    tracing::info!(
        bucket = %client.bucket(),
        region = %client.region(),
        endpoint = client.endpoint().unwrap_or("aws"),
        keep_alive_secs = client.keep_alive().as_secs(),
        "Storage client ready"
    );
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("AKID", "SECRET", None, None, "test")
    }

    fn storage_config() -> StorageConfig {
        StorageConfig {
            bucket: Some("build-cache".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_default_pool_keeps_alive_for_a_minute() {
        let client = StorageClient::new(credentials(), &storage_config()).unwrap();
        assert_eq!(client.keep_alive(), Duration::from_secs(60));
        assert_eq!(client.bucket(), "build-cache");
    }

    #[tokio::test]
    async fn test_region_is_applied_to_the_sdk_client() {
        let mut config = storage_config();
        config.region = "eu-central-1".into();
        let client = StorageClient::new(credentials(), &config).unwrap();
        assert_eq!(client.region(), "eu-central-1");
        assert_eq!(
            client.client().config().region().map(|r| r.as_ref()),
            Some("eu-central-1")
        );
        assert_eq!(client.endpoint(), None);
    }

    #[tokio::test]
    async fn test_custom_endpoint() {
        let mut config = storage_config();
        config.endpoint = Some("http://localhost:9000/".into());
        let client = StorageClient::new(credentials(), &config).unwrap();
        assert_eq!(client.endpoint(), Some("http://localhost:9000"));
    }

    #[tokio::test]
    async fn test_requires_bucket() {
        let err = StorageClient::new(credentials(), &StorageConfig::default()).unwrap_err();
        assert!(matches!(err, CredentialError::Client(_)));
    }
}
