use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::core::constants::MCP_PATH;
use crate::core::shutdown::ShutdownService;
use crate::domain::tempo::TempoService;

mod tools;
mod types;

use self::tools::TempoMcpServer;

/// Streamable HTTP MCP endpoint. Sessions live in one shared
/// `LocalSessionManager`; each new session gets its own `TempoMcpServer`
/// over the shared `TempoService`.
pub fn routes(tempo: Arc<TempoService>, ct: CancellationToken) -> Router<()> {
    let service = StreamableHttpService::new(
        move || Ok(TempoMcpServer::new(tempo.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: ct,
            ..Default::default()
        },
    );

    Router::new().nest_service(MCP_PATH, service)
}

/// Serve MCP over stdin/stdout until the client disconnects or shutdown fires
pub async fn serve_stdio(tempo: Arc<TempoService>, shutdown: &ShutdownService) -> Result<()> {
    let running = TempoMcpServer::new(tempo)
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to start MCP stdio transport")?;

    let ct = running.cancellation_token();
    let shutdown_ct = shutdown.cancellation_token();
    tokio::spawn(async move {
        shutdown_ct.cancelled().await;
        ct.cancel();
    });

    let reason = running
        .waiting()
        .await
        .context("MCP stdio transport task failed")?;
    tracing::debug!(reason = ?reason, "MCP stdio transport stopped");
    Ok(())
}
