// =============================================================================
// Application Identity
// =============================================================================

/// Application name (for display)
pub const APP_NAME: &str = "Tempo MCP";

/// Application name in lowercase (for paths, identifiers and the MCP server info)
pub const APP_NAME_LOWER: &str = "tempo-mcp";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tempo-mcp";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tempo-mcp.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TEMPO_MCP_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "TEMPO_MCP_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TEMPO_MCP_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TEMPO_MCP_LOG";

/// Environment variable for the MCP transport (`http` or `stdio`)
pub const ENV_TRANSPORT: &str = "TEMPO_MCP_TRANSPORT";

// =============================================================================
// Environment Variables - Tempo
// =============================================================================

/// Environment variable for the Tempo base URL
pub const ENV_TEMPO_URL: &str = "TEMPO_URL";

/// Environment variable for the Tempo bearer token
pub const ENV_TEMPO_TOKEN: &str = "TEMPO_TOKEN";

/// Environment variable for the Tempo basic-auth username
pub const ENV_TEMPO_USERNAME: &str = "TEMPO_USERNAME";

/// Environment variable for the Tempo basic-auth password
pub const ENV_TEMPO_PASSWORD: &str = "TEMPO_PASSWORD";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Mount point of the streamable HTTP MCP endpoint
pub const MCP_PATH: &str = "/mcp";

/// Liveness endpoint
pub const HEALTH_PATH: &str = "/health";

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Tempo Defaults
// =============================================================================

/// Backend used when neither the call nor the configuration names one
pub const DEFAULT_TEMPO_URL: &str = "http://localhost:3200";

/// Per-request timeout for Tempo calls
pub const TEMPO_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Trace search result limit when the caller gives none
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Trace search looks back this far when no start is given
pub const DEFAULT_SEARCH_WINDOW_SECS: i64 = 3_600;

// =============================================================================
// Tempo API Paths
// =============================================================================

pub const API_SEARCH_PATH: &str = "/api/search";

pub const API_SEARCH_TAGS_PATH: &str = "/api/search/tags";

// =============================================================================
// Diagnostics
// =============================================================================

/// Max characters of a backend error body carried into an error message
pub const ERROR_BODY_SNIPPET_LEN: usize = 500;

/// Bytes of an unparseable search body written to the log
pub const SEARCH_PARSE_SNIPPET_BYTES: usize = 100;

/// Bytes of other unparseable bodies written to the log
pub const PARSE_SNIPPET_BYTES: usize = 200;
