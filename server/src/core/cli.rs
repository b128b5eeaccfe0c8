use std::path::PathBuf;

use clap::Parser;

use super::config::McpTransport;
use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_PORT, ENV_TEMPO_PASSWORD, ENV_TEMPO_TOKEN, ENV_TEMPO_URL,
    ENV_TEMPO_USERNAME, ENV_TRANSPORT,
};

use crate::utils::string::sanitize_url;

#[derive(Parser)]
#[command(name = "tempo-mcp")]
#[command(version, about = "MCP server for querying Grafana Tempo", long_about = None)]
pub struct Cli {
    /// Server host address (HTTP transport)
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port (HTTP transport)
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// MCP transport (http or stdio)
    #[arg(long, short = 't', env = ENV_TRANSPORT, value_parser = parse_transport)]
    pub transport: Option<McpTransport>,

    /// Default Tempo base URL
    #[arg(long, env = ENV_TEMPO_URL)]
    pub tempo_url: Option<String>,

    /// Bearer token for Tempo (takes precedence over basic auth)
    #[arg(long, env = ENV_TEMPO_TOKEN, hide_env_values = true)]
    pub tempo_token: Option<String>,

    /// Basic-auth username for Tempo
    #[arg(long, env = ENV_TEMPO_USERNAME)]
    pub tempo_username: Option<String>,

    /// Basic-auth password for Tempo
    #[arg(long, env = ENV_TEMPO_PASSWORD, hide_env_values = true)]
    pub tempo_password: Option<String>,
}

/// Parse transport from CLI/env string
fn parse_transport(s: &str) -> Result<McpTransport, String> {
    match s.to_lowercase().as_str() {
        "http" | "streamable-http" => Ok(McpTransport::Http),
        "stdio" => Ok(McpTransport::Stdio),
        _ => Err(format!(
            "Invalid transport '{}'. Valid options: http, stdio",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub transport: Option<McpTransport>,
    pub tempo_url: Option<String>,
    pub tempo_token: Option<String>,
    pub tempo_username: Option<String>,
    pub tempo_password: Option<String>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CliConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("config", &self.config)
            .field("transport", &self.transport)
            .field("tempo_url", &self.tempo_url.as_deref().map(sanitize_url))
            .field("tempo_token", &redact(&self.tempo_token))
            .field("tempo_username", &self.tempo_username)
            .field("tempo_password", &redact(&self.tempo_password))
            .finish()
    }
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            transport: cli.transport,
            tempo_url: cli.tempo_url,
            tempo_token: cli.tempo_token,
            tempo_username: cli.tempo_username,
            tempo_password: cli.tempo_password,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
