//! Web server for dropkey.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::store::{FileStore, Sweeper};
use crate::{DropkeyError, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::{create_docs_router, create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Rate limit state.
    rate_limit: Arc<RateLimitState>,
    /// Configuration.
    config: Config,
}

impl WebServer {
    /// Create a new web server from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| DropkeyError::Config(format!("invalid server address: {e}")))?;

        let storage_dir = config.storage.resolved_dir();
        tracing::info!("Storage directory: {}", storage_dir.display());

        let store = FileStore::new(storage_dir);
        let app_state = Arc::new(
            AppState::new(store).with_max_upload_size(config.storage.max_upload_size_bytes()),
        );
        let rate_limit = Arc::new(RateLimitState::new(&config.rate_limits));

        Ok(Self {
            addr,
            app_state,
            rate_limit,
            config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Assemble the full router with health and docs routes.
    fn build_router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.rate_limit.clone(),
            &self.config.server.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_docs_router())
        .layer(CompressionLayer::new())
    }

    /// Start the expiry sweeper for this server's store.
    fn start_sweeper(&self) -> Sweeper {
        let interval = Duration::from_secs(self.config.retention.sweep_interval_secs);
        let age_limit = Duration::from_secs(self.config.retention.age_limit_secs);
        tracing::info!(
            interval_secs = interval.as_secs(),
            age_limit_secs = age_limit.as_secs(),
            "Sweeper started"
        );
        Sweeper::start(self.app_state.store.clone(), interval, age_limit)
    }

    /// Run the web server until shutdown.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Background tasks start after a successful bind
        let mut sweeper = self.start_sweeper();
        self.rate_limit.clone().start_cleanup_task();

        tracing::info!("Web server listening on http://{}", local_addr);

        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        sweeper.stop();
        result
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = self.build_router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        let mut sweeper = self.start_sweeper();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            let result = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
            sweeper.stop();
            if let Err(e) = result {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Resolve when the process receives a shutdown signal.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
