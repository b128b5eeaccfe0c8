//! Plain-text rendering of Tempo results
//!
//! Output is deterministic for a given record and never ends with a newline.

use std::fmt::{self, Write};

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::types::{
    Attribute, Span, TagNamesResult, TagValuesResult, TraceDetail, TraceSearchResult,
};
use crate::utils::time::{
    format_duration_nanos, nanos_to_datetime, parse_nanos_str, to_rfc3339_nanos, to_rfc3339_secs,
};

pub const NO_TRACES_FOUND: &str = "No traces found matching the search criteria";
pub const NO_TRACE_FOUND: &str = "No trace found";
pub const NO_TAG_NAMES_FOUND: &str = "No tag names found";

/// Render search hits as a numbered list
pub fn format_trace_list(result: &TraceSearchResult) -> String {
    if result.traces.is_empty() {
        if let Some(metrics) = &result.metrics {
            tracing::debug!(%metrics, "Search returned no traces");
        }
        return NO_TRACES_FOUND.to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Found {} traces:\n", result.traces.len());

    for (i, trace) in result.traces.iter().enumerate() {
        let _ = writeln!(out, "Trace {}:", i + 1);
        let _ = writeln!(out, "  TraceID: {}", trace.trace_id);
        let _ = writeln!(out, "  Service: {}", trace.root_service_name);
        let _ = writeln!(out, "  Name: {}", trace.root_trace_name);
        if let Some(start) = parse_nanos_str(&trace.start_time_unix_nano) {
            let _ = writeln!(out, "  Start Time: {}", to_rfc3339_secs(&start));
        }
        let _ = writeln!(out, "  Duration: {} ms", trace.duration_ms);
        if !trace.attributes.is_empty() {
            out.push_str("  Attributes:\n");
            for (key, value) in &trace.attributes {
                let _ = writeln!(out, "    {key}: {value}");
            }
        }
        out.push('\n');
    }

    finish(out)
}

/// Why the structured trace walk gave up
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("span {span_id} ends before it starts")]
    InvertedSpan { span_id: String },
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
}

/// Render a full trace, falling back to indented JSON if the span walk fails
pub fn format_trace_detail(detail: &TraceDetail) -> String {
    if detail.batches.is_empty() {
        return NO_TRACE_FOUND.to_string();
    }

    with_json_fallback(detail, render_trace_detail)
}

fn with_json_fallback(
    detail: &TraceDetail,
    render: impl FnOnce(&TraceDetail) -> Result<String, RenderError>,
) -> String {
    match render(detail) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to render trace, falling back to JSON");
            let json =
                serde_json::to_string_pretty(detail).unwrap_or_else(|_| format!("{detail:#?}"));
            finish(format!("Trace Details:\n\n{json}"))
        }
    }
}

/// Structured walk over batches and spans
pub fn render_trace_detail(detail: &TraceDetail) -> Result<String, RenderError> {
    let mut out = String::new();
    writeln!(out, "Trace Details:\n")?;

    if let Some(first) = detail.batches.first() {
        let trace_id = first
            .spans()
            .map(|span| span.trace_id.as_str())
            .find(|id| !id.is_empty())
            .unwrap_or_default();
        writeln!(out, "Service: {}", first.service_name().unwrap_or_default())?;
        writeln!(out, "Trace ID: {trace_id}")?;
        writeln!(out, "Total Batches: {}\n", detail.batches.len())?;
    }

    let spans: Vec<&Span> = detail.batches.iter().flat_map(|b| b.spans()).collect();
    if !spans.is_empty() {
        writeln!(out, "Spans ({} total):\n", spans.len())?;
        for (i, span) in spans.into_iter().enumerate() {
            write_span(&mut out, span, i + 1)?;
        }
    }

    Ok(finish(out))
}

fn write_span(out: &mut String, span: &Span, index: usize) -> Result<(), RenderError> {
    writeln!(out, "Span {index}:")?;

    for (label, value) in [
        ("Span ID", &span.span_id),
        ("Parent Span ID", &span.parent_span_id),
        ("Name", &span.name),
        ("Kind", &span.kind),
    ] {
        if !value.is_empty() {
            writeln!(out, "  {label}: {value}")?;
        }
    }

    let start = span.start_time_unix_nano.parse::<i64>().ok();
    let end = span.end_time_unix_nano.parse::<i64>().ok();
    if let Some(dt) = start.and_then(nanos_to_datetime) {
        writeln!(out, "  Start Time: {}", to_rfc3339_nanos(&dt))?;
    }
    if let Some(dt) = end.and_then(nanos_to_datetime) {
        writeln!(out, "  End Time: {}", to_rfc3339_nanos(&dt))?;
    }
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(RenderError::InvertedSpan {
                span_id: span.span_id.clone(),
            });
        }
        writeln!(out, "  Duration: {}", format_duration_nanos(end - start))?;
    }

    if !span.attributes.is_empty() {
        out.push_str("  Attributes:\n");
        write_attributes(out, &span.attributes, "    ")?;
    }

    if !span.events.is_empty() {
        out.push_str("  Events:\n");
        for event in &span.events {
            if !event.name.is_empty() {
                writeln!(out, "    Event: {}", event.name)?;
            }
            if let Some(dt) = parse_nanos_str(&event.time_unix_nano) {
                writeln!(out, "      Time: {}", to_rfc3339_nanos(&dt))?;
            }
            write_attributes(out, &event.attributes, "      ")?;
        }
    }

    out.push('\n');
    Ok(())
}

fn write_attributes(out: &mut String, attributes: &[Attribute], indent: &str) -> fmt::Result {
    for attr in attributes {
        if let Some(text) = attr.value.display_text() {
            writeln!(out, "{indent}{}: {text}", attr.key)?;
        }
    }
    Ok(())
}

/// Render tag names as a numbered list
pub fn format_tag_names(result: &TagNamesResult) -> String {
    if result.tag_names.is_empty() {
        return NO_TAG_NAMES_FOUND.to_string();
    }

    let mut out = format!("Found {} tag names:\n\n", result.tag_names.len());
    write_numbered(&mut out, &result.tag_names);
    write_metrics(&mut out, result.metrics.as_ref());
    finish(out)
}

/// Render the values seen for one tag
pub fn format_tag_values(result: &TagValuesResult, tag_name: &str) -> String {
    if result.tag_values.is_empty() {
        return format!("No values found for tag '{tag_name}'");
    }

    let mut out = format!(
        "Found {} values for tag '{tag_name}':\n\n",
        result.tag_values.len()
    );
    write_numbered(&mut out, &result.tag_values);
    write_metrics(&mut out, result.metrics.as_ref());
    finish(out)
}

fn write_numbered(out: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
}

fn write_metrics(out: &mut String, metrics: Option<&JsonValue>) {
    let Some(metrics) = metrics else {
        return;
    };
    if let Ok(json) = serde_json::to_string_pretty(metrics) {
        out.push_str("\nMetrics:\n");
        out.push_str(&json);
    }
}

fn finish(mut out: String) -> String {
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tempo::types::{AttributeValue, Batch, TraceSummary};
    use serde_json::json;

    fn summary(id: &str) -> TraceSummary {
        TraceSummary {
            trace_id: id.to_string(),
            root_service_name: "svc".to_string(),
            root_trace_name: "GET /".to_string(),
            start_time_unix_nano: "1700000000000000000".to_string(),
            duration_ms: 42,
            ..Default::default()
        }
    }

    #[test]
    fn test_trace_list_empty() {
        assert_eq!(
            format_trace_list(&TraceSearchResult::default()),
            "No traces found matching the search criteria"
        );
    }

    #[test]
    fn test_trace_list_single() {
        let result = TraceSearchResult {
            traces: vec![summary("abc123")],
            ..Default::default()
        };
        assert_eq!(
            format_trace_list(&result),
            "Found 1 traces:\n\n\
             Trace 1:\n  \
             TraceID: abc123\n  \
             Service: svc\n  \
             Name: GET /\n  \
             Start Time: 2023-11-14T22:13:20Z\n  \
             Duration: 42 ms"
        );
    }

    #[test]
    fn test_trace_list_skips_unparseable_start_and_lists_attributes() {
        let mut trace = summary("t2");
        trace.start_time_unix_nano = "soon".to_string();
        trace.attributes.insert("env".into(), "prod".into());
        let result = TraceSearchResult {
            traces: vec![summary("t1"), trace],
            ..Default::default()
        };
        let text = format_trace_list(&result);

        assert!(text.starts_with("Found 2 traces:\n\nTrace 1:\n"));
        assert!(text.contains("Duration: 42 ms\n\nTrace 2:\n"));
        assert_eq!(text.matches("Start Time:").count(), 1);
        assert!(text.ends_with("  Attributes:\n    env: prod"));
    }

    #[test]
    fn test_trace_detail_empty() {
        assert_eq!(format_trace_detail(&TraceDetail::default()), "No trace found");
    }

    fn sample_detail() -> TraceDetail {
        serde_json::from_value(json!({
            "batches": [
                {
                    "resource": {"attributes": [
                        {"key": "service.name", "value": {"stringValue": "frontend"}}
                    ]},
                    "scopeSpans": [{"scope": {"name": "otel"}, "spans": [{
                        "traceId": "t-1",
                        "spanId": "s-1",
                        "name": "GET /cart",
                        "kind": "SPAN_KIND_SERVER",
                        "startTimeUnixNano": "1700000000000000000",
                        "endTimeUnixNano": "1700000001500000000",
                        "attributes": [
                            {"key": "http.method", "value": {"stringValue": "GET"}},
                            {"key": "http.status_code", "value": {"intValue": "200"}},
                            {"key": "retry", "value": {"boolValue": false}}
                        ],
                        "events": [{
                            "name": "exception",
                            "timeUnixNano": "1700000000250000000",
                            "attributes": [{"key": "exception.type", "value": {"stringValue": "Timeout"}}]
                        }]
                    }]}]
                },
                {
                    "resource": {"attributes": [
                        {"key": "service.name", "value": {"stringValue": "cart"}}
                    ]},
                    "scopeSpans": [{"spans": [{
                        "traceId": "t-1",
                        "spanId": "s-2",
                        "parentSpanId": "s-1",
                        "name": "db.query",
                        "startTimeUnixNano": "1700000000100000000",
                        "endTimeUnixNano": "1700000000350000000"
                    }]}]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_trace_detail_full_render() {
        let expected = "\
Trace Details:

Service: frontend
Trace ID: t-1
Total Batches: 2

Spans (2 total):

Span 1:
  Span ID: s-1
  Name: GET /cart
  Kind: SPAN_KIND_SERVER
  Start Time: 2023-11-14T22:13:20.000000000Z
  End Time: 2023-11-14T22:13:21.500000000Z
  Duration: 1.5s
  Attributes:
    http.method: GET
    http.status_code: 200
  Events:
    Event: exception
      Time: 2023-11-14T22:13:20.250000000Z
      exception.type: Timeout

Span 2:
  Span ID: s-2
  Parent Span ID: s-1
  Name: db.query
  Start Time: 2023-11-14T22:13:20.100000000Z
  End Time: 2023-11-14T22:13:20.350000000Z
  Duration: 250ms";
        assert_eq!(format_trace_detail(&sample_detail()), expected);
    }

    #[test]
    fn test_trace_detail_batch_without_spans() {
        let detail = TraceDetail {
            batches: vec![Batch::default()],
        };
        assert_eq!(
            format_trace_detail(&detail),
            "Trace Details:\n\nService: \nTrace ID: \nTotal Batches: 1"
        );
    }

    #[test]
    fn test_trace_detail_inverted_span_falls_back_to_json() {
        let detail: TraceDetail = serde_json::from_value(json!({
            "batches": [{"scopeSpans": [{"spans": [{
                "spanId": "s-9",
                "name": "backwards",
                "startTimeUnixNano": "1700000002000000000",
                "endTimeUnixNano": "1700000001000000000"
            }]}]}]
        }))
        .unwrap();

        assert!(matches!(
            render_trace_detail(&detail),
            Err(RenderError::InvertedSpan { ref span_id }) if span_id == "s-9"
        ));

        let text = format_trace_detail(&detail);
        let json = text.strip_prefix("Trace Details:\n\n").unwrap();
        let value: JsonValue = serde_json::from_str(json).unwrap();
        assert_eq!(value["batches"][0]["scopeSpans"][0]["spans"][0]["spanId"], "s-9");
        assert!(json.contains("\n  \"batches\": ["));
    }

    #[test]
    fn test_json_fallback_on_any_render_error() {
        let detail = sample_detail();
        let text = with_json_fallback(&detail, |_| Err(RenderError::Fmt(fmt::Error)));
        let expected = format!(
            "Trace Details:\n\n{}",
            serde_json::to_string_pretty(&detail).unwrap()
        );
        assert_eq!(text, expected);
        assert!(!text.contains("Span 1:"));
    }

    #[test]
    fn test_trace_detail_service_requires_string_value() {
        let detail: TraceDetail = serde_json::from_value(json!({
            "batches": [{"resource": {"attributes": [
                {"key": "service.name", "value": {"intValue": 5}}
            ]}}]
        }))
        .unwrap();
        assert!(format_trace_detail(&detail).contains("Service: \n"));
    }

    #[test]
    fn test_attribute_arrays_not_rendered() {
        let mut out = String::new();
        write_attributes(
            &mut out,
            &[Attribute {
                key: "tags".into(),
                value: AttributeValue::Array(vec![AttributeValue::String("a".into())]),
            }],
            "    ",
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_tag_names_empty() {
        assert_eq!(format_tag_names(&TagNamesResult::default()), "No tag names found");
    }

    #[test]
    fn test_tag_names_list() {
        let result = TagNamesResult {
            tag_names: vec!["http.method".into(), "service.name".into()],
            ..Default::default()
        };
        assert_eq!(
            format_tag_names(&result),
            "Found 2 tag names:\n\n1. http.method\n2. service.name"
        );
    }

    #[test]
    fn test_tag_names_with_metrics() {
        let result = TagNamesResult {
            tag_names: vec!["a".into()],
            metrics: Some(json!({"inspectedBytes": "10"})),
            ..Default::default()
        };
        assert_eq!(
            format_tag_names(&result),
            "Found 1 tag names:\n\n1. a\n\nMetrics:\n{\n  \"inspectedBytes\": \"10\"\n}"
        );
    }

    #[test]
    fn test_tag_values_empty() {
        assert_eq!(
            format_tag_values(&TagValuesResult::default(), "service.name"),
            "No values found for tag 'service.name'"
        );
    }

    #[test]
    fn test_tag_values_list() {
        let result = TagValuesResult {
            tag_values: vec!["cart".into(), "frontend".into()],
            ..Default::default()
        };
        assert_eq!(
            format_tag_values(&result, "service.name"),
            "Found 2 values for tag 'service.name':\n\n1. cart\n2. frontend"
        );
    }
}
