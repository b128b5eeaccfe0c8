use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::tempo::{
    SearchTagValuesRequest, SearchTagsRequest, SearchTracesRequest, TraceByIdRequest,
};

/// Property patched at router construction to name the configured backend
pub const URL_PROPERTY: &str = "url";

#[derive(Deserialize, JsonSchema)]
pub struct SearchTracesInput {
    /// Tempo trace search query string
    pub query: String,
    /// Tempo server URL
    pub url: Option<String>,
    /// Start time for the query (default: 1h ago; same formats as the other tools)
    pub start: Option<String>,
    /// End time for the query (default: now)
    pub end: Option<String>,
    /// Maximum number of traces to return (default: 20)
    pub limit: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct TraceByIdInput {
    /// The trace ID to retrieve
    #[serde(rename = "traceID")]
    pub trace_id: String,
    /// Tempo server URL
    pub url: Option<String>,
    /// Start time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub start: Option<String>,
    /// End time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub end: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchTagsInput {
    /// Tempo server URL
    pub url: Option<String>,
    /// Scope of the tags (resource|span|intrinsic). Default: all scopes
    pub scope: Option<String>,
    /// Start time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub start: Option<String>,
    /// End time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub end: Option<String>,
    /// Maximum number of tag values to return
    pub limit: Option<f64>,
    /// Limits the search for tag names. Search stops if this many stale values are found
    #[serde(rename = "maxStaleValues")]
    pub max_stale_values: Option<f64>,
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchTagValuesInput {
    /// The tag name to search values for (e.g., 'service.name', 'http.method')
    #[serde(rename = "tagName")]
    pub tag_name: String,
    /// Tempo server URL
    pub url: Option<String>,
    /// Start time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub start: Option<String>,
    /// End time for the search (unix epoch seconds, RFC 3339, -1h style relative, or now)
    pub end: Option<String>,
    /// Maximum number of tag values to return
    pub limit: Option<f64>,
    /// Limits the search for tag values. Search stops if this many stale values are found
    #[serde(rename = "maxStaleValues")]
    pub max_stale_values: Option<f64>,
}

/// JSON numbers arrive as floats or integers; fractions truncate toward zero
fn truncate(n: Option<f64>) -> Option<i64> {
    n.map(|v| v as i64)
}

impl From<SearchTracesInput> for SearchTracesRequest {
    fn from(input: SearchTracesInput) -> Self {
        Self {
            query: input.query,
            url: input.url,
            start: input.start,
            end: input.end,
            limit: truncate(input.limit),
        }
    }
}

impl From<TraceByIdInput> for TraceByIdRequest {
    fn from(input: TraceByIdInput) -> Self {
        Self {
            trace_id: input.trace_id,
            url: input.url,
            start: input.start,
            end: input.end,
        }
    }
}

impl From<SearchTagsInput> for SearchTagsRequest {
    fn from(input: SearchTagsInput) -> Self {
        Self {
            url: input.url,
            scope: input.scope,
            start: input.start,
            end: input.end,
            limit: truncate(input.limit),
            max_stale_values: truncate(input.max_stale_values),
        }
    }
}

impl From<SearchTagValuesInput> for SearchTagValuesRequest {
    fn from(input: SearchTagValuesInput) -> Self {
        Self {
            tag_name: input.tag_name,
            url: input.url,
            start: input.start,
            end: input.end,
            limit: truncate(input.limit),
            max_stale_values: truncate(input.max_stale_values),
        }
    }
}
