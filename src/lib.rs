//! Local caching proxy in front of an S3 bucket.
//!
//! # Architecture Overview
//!
//! ```text
//!   main ── guard::install() ── process-wide panic hook ──────────────┐
//!     │                                                               │
//!     ▼                                                               ▼
//!   lifecycle::startup::run                                  lifecycle::fatal
//!     1. config::resolve_config      (flags + TOML)          stderr line
//!     2. observability::init_logging (tracing)               + error event
//!     3. config::validate_config                             + exit(1)
//!     4. storage::connect            (credential chain)             ▲
//!     5. http::start_server          (axum, owns the client)        │
//!     any Err ─────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod credentials;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod storage;

pub use cli::CliArgs;
pub use config::CacheConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use storage::StorageClient;
