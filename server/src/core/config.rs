use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::tempo::AuthContext;
use crate::utils::file::expand_path;
use crate::utils::string::sanitize_url;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TEMPO_URL,
    TEMPO_REQUEST_TIMEOUT_SECS,
};

// =============================================================================
// MCP Transport Enum
// =============================================================================

/// How MCP clients reach the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// Streamable HTTP at `/mcp`
    #[default]
    Http,
    /// JSON-RPC over stdin/stdout
    Stdio,
}

impl fmt::Display for McpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McpTransport::Http => write!(f, "http"),
            McpTransport::Stdio => write!(f, "stdio"),
        }
    }
}

// =============================================================================
// File Configuration Structs
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<McpTransport>,
}

/// Tempo backend section
#[derive(Default, Clone, Deserialize)]
pub struct TempoFileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for TempoFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TempoFileConfig")
            .field("url", &self.url.as_deref().map(sanitize_url))
            .field("token", &redact(&self.token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub tempo: Option<TempoFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        // Server
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
            if server.transport.is_some() {
                tracing::trace!(transport = ?server.transport, "Merging server.transport");
                current.transport = server.transport;
            }
        }

        // Tempo
        if let Some(tempo) = other.tempo {
            let current = self.tempo.get_or_insert_with(TempoFileConfig::default);
            if tempo.url.is_some() {
                tracing::trace!("Merging tempo.url");
                current.url = tempo.url;
            }
            if tempo.token.is_some() {
                tracing::trace!("Merging tempo.token");
                current.token = tempo.token;
            }
            if tempo.username.is_some() {
                tracing::trace!("Merging tempo.username");
                current.username = tempo.username;
            }
            if tempo.password.is_some() {
                tracing::trace!("Merging tempo.password");
                current.password = tempo.password;
            }
            if tempo.timeout_secs.is_some() {
                tracing::trace!(timeout_secs = ?tempo.timeout_secs, "Merging tempo.timeout_secs");
                current.timeout_secs = tempo.timeout_secs;
            }
        }
    }
}

// =============================================================================
// Final Configuration Structs
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub transport: McpTransport,
}

/// Tempo backend configuration shared by every tool call
#[derive(Debug, Clone)]
pub struct TempoConfig {
    /// Backend used when a call gives no `url`
    pub url: String,
    pub auth: AuthContext,
    pub timeout: Duration,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub tempo: TempoConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.tempo-mcp/tempo-mcp.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_server = file_config.server.unwrap_or_default();
        let file_tempo = file_config.tempo.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
            transport: cli
                .transport
                .or(file_server.transport)
                .unwrap_or_default(),
        };

        // An empty TEMPO_URL counts as unset
        let url = cli
            .tempo_url
            .clone()
            .filter(|u| !u.is_empty())
            .or(file_tempo.url.filter(|u| !u.is_empty()))
            .unwrap_or_else(|| DEFAULT_TEMPO_URL.to_string());

        let token = cli.tempo_token.clone().or(file_tempo.token);
        let username = cli.tempo_username.clone().or(file_tempo.username);
        let password = cli.tempo_password.clone().or(file_tempo.password);
        let auth = AuthContext::resolve(token.as_deref(), username.as_deref(), password.as_deref());

        let tempo = TempoConfig {
            url,
            auth,
            timeout: Duration::from_secs(
                file_tempo
                    .timeout_secs
                    .unwrap_or(TEMPO_REQUEST_TIMEOUT_SECS),
            ),
        };

        let config = Self { server, tempo };
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            transport = %config.server.transport,
            tempo_url = %sanitize_url(&config.tempo.url),
            tempo_auth = config.tempo.auth.scheme(),
            timeout_secs = config.tempo.timeout.as_secs(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.transport == McpTransport::Http {
            // Host must not be empty
            if self.server.host.is_empty() {
                anyhow::bail!("Configuration error: server.host must not be empty");
            }

            // Port must be non-zero (port 0 would cause bind failure)
            if self.server.port == 0 {
                anyhow::bail!("Configuration error: server.port must be greater than 0");
            }
        }

        if self.tempo.timeout.is_zero() {
            anyhow::bail!("Configuration error: tempo.timeout_secs must be greater than 0");
        }

        let url = reqwest::Url::parse(&self.tempo.url).with_context(|| {
            format!(
                "Configuration error: tempo.url is not a valid URL: {}",
                sanitize_url(&self.tempo.url)
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Configuration error: tempo.url must start with http:// or https://. Got: {}",
                sanitize_url(&self.tempo.url)
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.tempo-mcp/tempo-mcp.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}
