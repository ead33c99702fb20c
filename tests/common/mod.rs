//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::process::Command;
use std::time::Duration;

use s3cache::credentials::Credentials;
use s3cache::{CacheConfig, StorageClient};

/// Environment variables that could let a credential source succeed.
const CREDENTIAL_VARS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "AWS_PROFILE",
    "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI",
    "AWS_CONTAINER_CREDENTIALS_FULL_URI",
    "AWS_CONTAINER_AUTHORIZATION_TOKEN",
    "RUST_LOG",
    "S3CACHE_CONFIG",
];

/// A `Command` for the built binary with every credential source disabled.
///
/// `HOME` points at the temp dir so the default log file never lands in the
/// real home directory.
pub fn s3cache_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_s3cache"));
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.env("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/aws/credentials")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env("HOME", std::env::temp_dir());
    cmd
}

/// Find a port nobody is listening on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Lines of `stderr` that carry the fatal prefix.
pub fn fatal_lines(stderr: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .filter(|l| l.starts_with("s3cache: "))
        .map(String::from)
        .collect()
}

/// Storage client with static credentials, for tests that never reach S3.
pub fn test_storage(config: &CacheConfig) -> StorageClient {
    let credentials = Credentials::new("AKIDTEST", "SECRET", None, None, "test");
    StorageClient::new(credentials, &config.storage).unwrap()
}

/// Poll `/ping` until the server answers.
pub async fn wait_for_ping(addr: SocketAddr) {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    for _ in 0..100 {
        if let Ok(res) = client.get(format!("http://{}/ping", addr)).send().await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server at {} never answered /ping", addr);
}
