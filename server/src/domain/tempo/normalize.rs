//! Decoding of Tempo response bodies into typed records
//!
//! Trace search goes through a repair pass and a two-phase decode: strict serde
//! first, then a field-by-field projection of a generic JSON tree. The other
//! endpoints decode strictly.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use super::error::TempoError;
use super::types::{TagNamesResult, TagValuesResult, TraceDetail, TraceSearchResult, TraceSummary};
use crate::core::constants::{PARSE_SNIPPET_BYTES, SEARCH_PARSE_SNIPPET_BYTES};
use crate::utils::string::body_snippet;

/// Decode a `/api/search` body, tolerating quoting glitches and mistyped fields
pub fn parse_trace_search(body: &[u8]) -> Result<TraceSearchResult, TempoError> {
    let cleaned = repair_search_body(body);

    let result = match serde_json::from_slice::<TraceSearchResult>(&cleaned) {
        Ok(result) => result,
        Err(strict_err) => {
            tracing::warn!(
                error = %strict_err,
                body = %body_snippet(&cleaned, SEARCH_PARSE_SNIPPET_BYTES),
                "Failed to parse Tempo search response, trying lenient decode"
            );
            // Invalid UTF-8 inside strings becomes U+FFFD rather than failing
            let text = String::from_utf8_lossy(&cleaned);
            match serde_json::from_str::<JsonValue>(&text) {
                Ok(JsonValue::Object(root)) => {
                    let projected = project_search_result(&root);
                    tracing::debug!(traces = projected.traces.len(), "Used lenient search decode");
                    projected
                }
                _ => return Err(TempoError::MalformedResponse(strict_err)),
            }
        }
    };

    check_error_status(result.error_status.as_deref())?;
    Ok(result)
}

/// Decode a `/api/traces/{id}` body
pub fn parse_trace_detail(body: &[u8]) -> Result<TraceDetail, TempoError> {
    parse_strict(body, "trace")
}

/// Decode a `/api/search/tags` body
pub fn parse_tag_names(body: &[u8]) -> Result<TagNamesResult, TempoError> {
    let result: TagNamesResult = parse_strict(body, "tags")?;
    check_error_status(result.error_status.as_deref())?;
    Ok(result)
}

/// Decode a `/api/search/tag/{name}/values` body
pub fn parse_tag_values(body: &[u8]) -> Result<TagValuesResult, TempoError> {
    let result: TagValuesResult = parse_strict(body, "tag values")?;
    check_error_status(result.error_status.as_deref())?;
    Ok(result)
}

/// Undo the stray-quote artifacts seen in some search responses.
///
/// Bodies that already end like a closed array or object are left alone.
pub fn repair_search_body(body: &[u8]) -> Cow<'_, [u8]> {
    let text = String::from_utf8_lossy(body);

    let looks_closed = text.ends_with("}]")
        || text.ends_with("]}")
        || (text.contains("}],") && text.ends_with('}'));
    if looks_closed {
        return Cow::Borrowed(body);
    }

    if text.contains("}]\"") {
        return Cow::Owned(text.replace("}]\"", "}]").into_bytes());
    }
    if text.contains("}]}\"") {
        return Cow::Owned(text.replace("}]}\"", "}]}").into_bytes());
    }
    Cow::Borrowed(body)
}

fn parse_strict<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, TempoError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(
            error = %e,
            body = %body_snippet(body, PARSE_SNIPPET_BYTES),
            "Failed to parse Tempo {what} response"
        );
        TempoError::MalformedResponse(e)
    })
}

fn check_error_status(error: Option<&str>) -> Result<(), TempoError> {
    match error {
        Some(message) if !message.is_empty() => Err(TempoError::BackendLogical {
            message: message.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Pull what can be type-checked out of a generic search body
fn project_search_result(root: &Map<String, JsonValue>) -> TraceSearchResult {
    let traces = root
        .get("traces")
        .and_then(JsonValue::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(JsonValue::as_object)
                .map(project_trace_summary)
                .collect()
        })
        .unwrap_or_default();

    TraceSearchResult {
        traces,
        metrics: None,
        error_status: root
            .get("error")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
    }
}

fn project_trace_summary(entry: &Map<String, JsonValue>) -> TraceSummary {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .unwrap_or_default()
    };

    TraceSummary {
        trace_id: text("traceID"),
        root_service_name: text("rootServiceName"),
        root_trace_name: text("rootTraceName"),
        start_time_unix_nano: text("startTimeUnixNano"),
        duration_ms: entry
            .get("durationMs")
            .and_then(JsonValue::as_f64)
            .map(|ms| ms as i64)
            .unwrap_or_default(),
        ..Default::default()
    }
}
