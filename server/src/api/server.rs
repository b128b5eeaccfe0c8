//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::mcp;
use super::routes::health;
use crate::core::config::ServerConfig;
use crate::core::constants::{HEALTH_PATH, SHUTDOWN_TIMEOUT_SECS};
use crate::core::shutdown::ShutdownService;
use crate::domain::tempo::TempoService;

pub struct ApiServer {
    config: ServerConfig,
    tempo: Arc<TempoService>,
    shutdown: ShutdownService,
}

impl ApiServer {
    pub fn new(config: ServerConfig, tempo: Arc<TempoService>, shutdown: ShutdownService) -> Self {
        Self {
            config,
            tempo,
            shutdown,
        }
    }

    fn router(&self) -> Router {
        let ct = self.shutdown.cancellation_token();

        Router::new()
            .route(HEALTH_PATH, get(health::health))
            .merge(mcp::routes(self.tempo.clone(), ct))
            .fallback(|| async { (StatusCode::NOT_FOUND, "Not Found") })
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown signal fires
    pub async fn start(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .host
                .parse()
                .with_context(|| format!("Invalid bind host: {}", self.config.host))?,
            self.config.port,
        );
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::debug!(%addr, "HTTP server listening");

        let graceful = self.shutdown.wait();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
        });

        tokio::select! {
            res = &mut server => {
                res.context("HTTP server task failed")??;
                return Ok(());
            }
            _ = self.shutdown.wait() => {}
        }

        // Open MCP streams may hold the drain; bound it
        match tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), server).await {
            Ok(res) => res.context("HTTP server task failed")??,
            Err(_) => tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT_SECS,
                "HTTP server did not drain in time, exiting"
            ),
        }

        tracing::debug!("HTTP server stopped");
        Ok(())
    }
}
