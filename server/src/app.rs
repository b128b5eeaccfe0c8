//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{self, ApiServer};
use crate::core::banner;
use crate::core::cli;
use crate::core::config::{AppConfig, McpTransport};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::domain::tempo::TempoService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub tempo: Arc<TempoService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        tracing::trace!(cli = ?cli_config, "Parsed CLI");

        let app = Self::init(AppConfig::load(&cli_config)?)?;
        app.start().await
    }

    fn init(config: AppConfig) -> Result<Self> {
        let tempo = TempoService::new(&config.tempo).context("Failed to initialize Tempo client")?;
        tracing::debug!(
            url = %crate::utils::string::sanitize_url(&config.tempo.url),
            auth = config.tempo.auth.scheme(),
            timeout_secs = config.tempo.timeout.as_secs(),
            "Tempo client initialized"
        );

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            tempo: Arc::new(tempo),
        })
    }

    /// Logs always go to stderr; stdout carries MCP frames on the stdio transport
    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER.replace('-', "_"));

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start(self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        self.shutdown.install_signal_handlers();

        match self.config.server.transport {
            McpTransport::Http => {
                banner::print_banner(
                    &self.config.server.host,
                    self.config.server.port,
                    &self.config.tempo.url,
                    self.config.tempo.auth.scheme(),
                );
                ApiServer::new(self.config.server, self.tempo, self.shutdown.clone())
                    .start()
                    .await?;
            }
            McpTransport::Stdio => {
                tracing::info!(
                    url = %crate::utils::string::sanitize_url(&self.config.tempo.url),
                    "Serving MCP over stdio"
                );
                api::serve_stdio(self.tempo, &self.shutdown).await?;
            }
        }

        tracing::debug!("Shutdown complete");
        Ok(())
    }
}
