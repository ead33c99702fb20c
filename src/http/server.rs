//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, concurrency limit, request ID)
//! - Bind server to listener
//! - Own the storage client for the lifetime of the process
//! - Stop on signal, on `/shutdown`, or after the idle timeout

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CacheConfig, CacheSettings};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::storage::StorageClient;

/// Error type for server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageClient>,
    pub cache: CacheSettings,
    pub shutdown: Shutdown,
    pub last_activity: Arc<Mutex<Instant>>,
}

/// HTTP server for the caching proxy.
pub struct HttpServer {
    router: Router,
    config: CacheConfig,
    shutdown: Shutdown,
    last_activity: Arc<Mutex<Instant>>,
    idle_timeout: Option<Duration>,
}

impl HttpServer {
    /// Create a new HTTP server. The server takes ownership of the storage client.
    pub fn new(storage: StorageClient, config: CacheConfig) -> Self {
        let shutdown = Shutdown::new();
        let last_activity = Arc::new(Mutex::new(Instant::now()));

        let state = AppState {
            storage: Arc::new(storage),
            cache: config.cache.clone(),
            shutdown: shutdown.clone(),
            last_activity: last_activity.clone(),
        };

        let idle_timeout = match config.cache.idle_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            shutdown,
            last_activity,
            idle_timeout,
        }
    }

    /// Override the idle timeout derived from `cache.idle_minutes`.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Handle that stops the server when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CacheConfig, state: AppState) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .route("/shutdown", get(shutdown))
            .route("/{*key}", get(cache_entry).head(cache_entry).put(cache_entry))
            .layer(middleware::from_fn_with_state(state.clone(), track_activity))
            .with_state(state)
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_connections = self.config.listener.max_connections,
            "HTTP server starting"
        );

        if self.config.observability.metrics_enabled {
            match self.config.observability.metrics_address.parse::<SocketAddr>() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(_) => tracing::error!(
                    metrics_address = %self.config.observability.metrics_address,
                    "Failed to parse metrics address"
                ),
            }
        }

        if let Some(idle_timeout) = self.idle_timeout {
            let shutdown = self.shutdown.clone();
            let last_activity = self.last_activity.clone();
            tokio::spawn(async move {
                watch_idle(idle_timeout, last_activity, shutdown).await;
            });
        }

        let mut stop = self.shutdown.subscribe();
        let graceful = async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = stop.recv() => tracing::info!("Shutdown requested"),
            }
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(graceful)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

/// Bind the configured address and serve until shutdown.
pub async fn start_server(storage: StorageClient, config: &CacheConfig) -> Result<(), ServerError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;

    HttpServer::new(storage, config.clone()).run(listener).await
}

/// Trigger shutdown once no request has arrived for `idle_timeout`.
async fn watch_idle(idle_timeout: Duration, last_activity: Arc<Mutex<Instant>>, shutdown: Shutdown) {
    let tick = (idle_timeout / 4).clamp(Duration::from_millis(10), Duration::from_secs(30));
    loop {
        tokio::time::sleep(tick).await;
        let idle = match last_activity.lock() {
            Ok(last) => last.elapsed(),
            Err(poisoned) => poisoned.into_inner().elapsed(),
        };
        if idle >= idle_timeout {
            tracing::info!(idle_secs = idle.as_secs(), "Idle timeout reached");
            shutdown.trigger();
            return;
        }
    }
}

async fn track_activity(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    match state.last_activity.lock() {
        Ok(mut last) => *last = start,
        Err(poisoned) => *poisoned.into_inner() = start,
    }

    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn ping() -> &'static str {
    "pong"
}

async fn shutdown(State(state): State<AppState>) -> &'static str {
    tracing::info!("Shutdown requested over HTTP");
    state.shutdown.trigger();
    "shutting down"
}

/// Cache lookups and uploads. Serving them is the cache engine's job; this
/// component only owns the connection to the bucket.
async fn cache_entry(
    State(state): State<AppState>,
    method: Method,
    Path(key): Path<String>,
) -> impl IntoResponse {
    tracing::debug!(
        method = %method,
        key = %key,
        bucket = %state.storage.bucket(),
        max_entry_size_bytes = state.cache.max_entry_size_bytes,
        "Cache request"
    );
    (StatusCode::NOT_IMPLEMENTED, "cache engine not available")
}
