//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, concurrency limit)
//!     → /ping, /shutdown, or the cache handler
//!     → Send to client
//! ```

pub mod server;

pub use server::{start_server, HttpServer, ServerError};
