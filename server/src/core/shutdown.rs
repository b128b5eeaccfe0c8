//! Centralized shutdown management

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shutdown signal shared by the HTTP server and the MCP sessions
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownService {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownService {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Wait for shutdown signal (for use with axum graceful shutdown)
    /// Returns an owned future that can be passed to graceful_shutdown
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&v| v).await;
        }
    }

    /// Token cancelled once shutdown triggers; rmcp sessions observe it
    pub fn cancellation_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let t = token.clone();
        let wait = self.wait();
        tokio::spawn(async move {
            wait.await;
            t.cancel();
        });
        token
    }

    /// Install OS signal handlers and auto-trigger on Ctrl+C/SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut signal) => {
                        signal.recv().await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::debug!("Received Ctrl+C, shutting down"),
                _ = terminate => tracing::debug!("Received SIGTERM, shutting down"),
            }

            service.trigger();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_pending_until_trigger() {
        let shutdown = ShutdownService::new();
        let pending = tokio::time::timeout(Duration::from_millis(20), shutdown.wait()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_wait_returns_after_trigger() {
        let shutdown = ShutdownService::new();
        let handle = tokio::spawn(shutdown.wait());

        tokio::task::yield_now().await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_after_trigger_returns_immediately() {
        let shutdown = ShutdownService::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancellation_token_follows_trigger() {
        let shutdown = ShutdownService::new();
        let token = shutdown.cancellation_token();
        assert!(!token.is_cancelled());

        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .unwrap();
    }
}
