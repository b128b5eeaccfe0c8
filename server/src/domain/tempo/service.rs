//! Tool-call orchestration against Tempo
//!
//! Each call resolves its arguments, builds one URL, performs one GET, decodes
//! the body and renders text. Nothing is kept between calls.

use chrono::{DateTime, Utc};

use super::client::TempoClient;
use super::error::{TempoError, ToolCallError};
use super::format::{format_tag_names, format_tag_values, format_trace_detail, format_trace_list};
use super::normalize::{parse_tag_names, parse_tag_values, parse_trace_detail, parse_trace_search};
use super::time::resolve_time_at;
use super::types::{SearchTagValuesParams, SearchTagsParams, SearchTracesParams, TraceByIdParams};
use super::url::{search_tag_values_url, search_tags_url, search_traces_url, trace_by_id_url};
use crate::core::config::TempoConfig;
use crate::core::constants::{DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_WINDOW_SECS};
use crate::utils::string::sanitize_url;

#[derive(Debug, Clone, Default)]
pub struct SearchTracesRequest {
    pub query: String,
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct TraceByIdRequest {
    pub trace_id: String,
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchTagsRequest {
    pub url: Option<String>,
    pub scope: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<i64>,
    pub max_stale_values: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchTagValuesRequest {
    pub tag_name: String,
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<i64>,
    pub max_stale_values: Option<i64>,
}

/// Entry point for the four Tempo tools
#[derive(Debug, Clone)]
pub struct TempoService {
    client: TempoClient,
    default_url: String,
}

impl TempoService {
    pub fn new(config: &TempoConfig) -> Result<Self, TempoError> {
        Ok(Self {
            client: TempoClient::new(config.auth.clone(), config.timeout)?,
            default_url: config.url.clone(),
        })
    }

    /// Backend used when a call does not name one
    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    pub async fn search_traces(&self, req: SearchTracesRequest) -> Result<String, ToolCallError> {
        tracing::info!(query = %req.query, "Received trace search request");
        let base = self.backend_url(req.url.as_deref());

        let now = Utc::now();
        let start = resolve_epoch(req.start.as_deref(), now, "invalid start time")?
            .unwrap_or(now.timestamp() - DEFAULT_SEARCH_WINDOW_SECS);
        let end = resolve_epoch(req.end.as_deref(), now, "invalid end time")?
            .unwrap_or(now.timestamp());
        check_range(Some(start), Some(end))?;
        let params = SearchTracesParams {
            query: req.query,
            start,
            end,
            limit: req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        };
        tracing::debug!(start, end, limit = params.limit, "Search parameters");

        let url = search_traces_url(base, &params)
            .map_err(|e| ToolCallError::new("failed to build search URL", e))?;
        let result = async {
            let body = self.client.fetch(url).await?;
            parse_trace_search(&body)
        }
        .await
        .map_err(|e| stage_failed("trace search failed", e))?;

        let text = format_trace_list(&result);
        tracing::info!(traces = result.traces.len(), "Trace search completed");
        Ok(text)
    }

    pub async fn get_trace_by_id(&self, req: TraceByIdRequest) -> Result<String, ToolCallError> {
        if req.trace_id.is_empty() {
            return Err(ToolCallError::new(
                "invalid arguments",
                TempoError::InvalidArgument(
                    "traceID parameter is required and must be a non-empty string".into(),
                ),
            ));
        }
        tracing::info!(trace_id = %req.trace_id, "Received trace retrieval request");
        let base = self.backend_url(req.url.as_deref());

        let now = Utc::now();
        let params = TraceByIdParams {
            start: resolve_epoch(req.start.as_deref(), now, "invalid start time")?,
            end: resolve_epoch(req.end.as_deref(), now, "invalid end time")?,
            trace_id: req.trace_id,
        };
        check_range(params.start, params.end)?;

        let url = trace_by_id_url(base, &params)
            .map_err(|e| ToolCallError::new("failed to build trace URL", e))?;
        let detail = async {
            let body = self.client.fetch(url).await?;
            parse_trace_detail(&body)
        }
        .await
        .map_err(|e| stage_failed("trace retrieval failed", e))?;

        let text = format_trace_detail(&detail);
        tracing::info!(
            trace_id = %params.trace_id,
            batches = detail.batches.len(),
            "Trace retrieved"
        );
        Ok(text)
    }

    pub async fn search_tags(&self, req: SearchTagsRequest) -> Result<String, ToolCallError> {
        tracing::info!(scope = ?req.scope, "Received tags search request");
        let base = self.backend_url(req.url.as_deref());

        let now = Utc::now();
        let params = SearchTagsParams {
            scope: req.scope,
            start: resolve_epoch(req.start.as_deref(), now, "invalid start time")?,
            end: resolve_epoch(req.end.as_deref(), now, "invalid end time")?,
            limit: req.limit,
            max_stale_values: req.max_stale_values,
        };
        check_range(params.start, params.end)?;

        let url = search_tags_url(base, &params)
            .map_err(|e| ToolCallError::new("failed to build tags URL", e))?;
        let result = async {
            let body = self.client.fetch(url).await?;
            parse_tag_names(&body)
        }
        .await
        .map_err(|e| stage_failed("tags search failed", e))?;

        let text = format_tag_names(&result);
        tracing::info!(tags = result.tag_names.len(), "Tags search completed");
        Ok(text)
    }

    pub async fn search_tag_values(
        &self,
        req: SearchTagValuesRequest,
    ) -> Result<String, ToolCallError> {
        if req.tag_name.is_empty() {
            return Err(ToolCallError::new(
                "invalid arguments",
                TempoError::InvalidArgument(
                    "tagName parameter is required and must be a non-empty string".into(),
                ),
            ));
        }
        tracing::info!(tag = %req.tag_name, "Received tag values search request");
        let base = self.backend_url(req.url.as_deref());

        let now = Utc::now();
        let params = SearchTagValuesParams {
            start: resolve_epoch(req.start.as_deref(), now, "invalid start time")?,
            end: resolve_epoch(req.end.as_deref(), now, "invalid end time")?,
            limit: req.limit,
            max_stale_values: req.max_stale_values,
            tag_name: req.tag_name,
        };
        check_range(params.start, params.end)?;

        let url = search_tag_values_url(base, &params)
            .map_err(|e| ToolCallError::new("failed to build tag values URL", e))?;
        let result = async {
            let body = self.client.fetch(url).await?;
            parse_tag_values(&body)
        }
        .await
        .map_err(|e| stage_failed("tag values search failed", e))?;

        let text = format_tag_values(&result, &params.tag_name);
        tracing::info!(
            tag = %params.tag_name,
            values = result.tag_values.len(),
            "Tag values search completed"
        );
        Ok(text)
    }

    /// A non-empty per-call URL wins over the configured one
    fn backend_url<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        let url = requested
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.default_url);
        tracing::debug!(url = %sanitize_url(url), "Using Tempo URL");
        url
    }
}

/// Resolve an optional time argument to epoch seconds; empty means absent
fn resolve_epoch(
    expr: Option<&str>,
    now: DateTime<Utc>,
    stage: &'static str,
) -> Result<Option<i64>, ToolCallError> {
    match expr.filter(|e| !e.is_empty()) {
        None => Ok(None),
        Some(expr) => resolve_time_at(expr, now)
            .map(|dt| Some(dt.timestamp()))
            .map_err(|e| ToolCallError::new(stage, e)),
    }
}

/// Reject a window whose start lies after its end
fn check_range(start: Option<i64>, end: Option<i64>) -> Result<(), ToolCallError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(ToolCallError::new(
            "invalid time range",
            TempoError::InvalidArgument(format!(
                "start ({start}) must not be after end ({end})"
            )),
        )),
        _ => Ok(()),
    }
}

fn stage_failed(stage: &'static str, err: TempoError) -> ToolCallError {
    tracing::warn!(error = %err, "{stage}");
    ToolCallError::new(stage, err)
}
