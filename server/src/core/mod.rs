//! Core application infrastructure

pub(crate) mod banner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;

pub use crate::app::CoreApp;
pub use cli::CliConfig;
pub use config::{AppConfig, McpTransport, ServerConfig, TempoConfig};
pub use shutdown::ShutdownService;
