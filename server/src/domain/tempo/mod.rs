//! Grafana Tempo access for the MCP tools
//!
//! Each tool call flows through: time resolution, URL building, one HTTP GET,
//! response normalization and text formatting.

pub mod client;
pub mod error;
pub mod format;
pub mod normalize;
pub mod service;
pub mod time;
pub mod types;
pub mod url;

pub use error::{TempoError, ToolCallError};
pub use service::{
    SearchTagValuesRequest, SearchTagsRequest, SearchTracesRequest, TempoService,
    TraceByIdRequest,
};
pub use types::AuthContext;
