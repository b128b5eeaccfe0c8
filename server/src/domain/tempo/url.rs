//! Tempo REST endpoint composition

use reqwest::Url;

use super::error::TempoError;
use super::types::{SearchTagValuesParams, SearchTagsParams, SearchTracesParams, TraceByIdParams};
use crate::core::constants::{API_SEARCH_PATH, API_SEARCH_TAGS_PATH};

/// `GET /api/search?q=..&start=..&end=..&limit=..`
pub fn search_traces_url(base: &str, params: &SearchTracesParams) -> Result<Url, TempoError> {
    let mut url = parse_base(base)?;
    append_fixed_path(&mut url, API_SEARCH_PATH);
    set_query(
        &mut url,
        [
            ("q", Some(params.query.clone())),
            ("start", Some(params.start.to_string())),
            ("end", Some(params.end.to_string())),
            ("limit", Some(params.limit.to_string())),
        ],
    );
    Ok(url)
}

/// `GET /api/traces/{traceID}`; the base path is always replaced
pub fn trace_by_id_url(base: &str, params: &TraceByIdParams) -> Result<Url, TempoError> {
    let mut url = parse_base(base)?;
    replace_path(&mut url, base, &["api", "traces", &params.trace_id])?;
    set_query(
        &mut url,
        [
            ("start", params.start.map(|v| v.to_string())),
            ("end", params.end.map(|v| v.to_string())),
        ],
    );
    Ok(url)
}

/// `GET /api/search/tags`
pub fn search_tags_url(base: &str, params: &SearchTagsParams) -> Result<Url, TempoError> {
    let mut url = parse_base(base)?;
    append_fixed_path(&mut url, API_SEARCH_TAGS_PATH);
    set_query(
        &mut url,
        [
            ("scope", params.scope.clone().filter(|s| !s.is_empty())),
            ("start", params.start.map(|v| v.to_string())),
            ("end", params.end.map(|v| v.to_string())),
            ("limit", params.limit.map(|v| v.to_string())),
            (
                "maxStaleValues",
                params.max_stale_values.map(|v| v.to_string()),
            ),
        ],
    );
    Ok(url)
}

/// `GET /api/search/tag/{tagName}/values`; the base path is always replaced
pub fn search_tag_values_url(
    base: &str,
    params: &SearchTagValuesParams,
) -> Result<Url, TempoError> {
    let mut url = parse_base(base)?;
    replace_path(
        &mut url,
        base,
        &["api", "search", "tag", &params.tag_name, "values"],
    )?;
    set_query(
        &mut url,
        [
            ("start", params.start.map(|v| v.to_string())),
            ("end", params.end.map(|v| v.to_string())),
            ("limit", params.limit.map(|v| v.to_string())),
            (
                "maxStaleValues",
                params.max_stale_values.map(|v| v.to_string()),
            ),
        ],
    );
    Ok(url)
}

fn parse_base(base: &str) -> Result<Url, TempoError> {
    let url = Url::parse(base.trim()).map_err(|e| TempoError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TempoError::InvalidUrl {
            url: base.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Append `fixed` to the base path unless it is already there
fn append_fixed_path(url: &mut Url, fixed: &str) {
    let path = url.path();
    if path.contains(fixed) {
        return;
    }
    let joined = match path {
        "" | "/" => fixed.to_string(),
        other => format!("{}{fixed}", other.trim_end_matches('/')),
    };
    url.set_path(&joined);
}

/// Set the path to exactly these segments, percent-encoding each one
fn replace_path(url: &mut Url, base: &str, segments: &[&str]) -> Result<(), TempoError> {
    let mut path = url.path_segments_mut().map_err(|_| TempoError::InvalidUrl {
        url: base.to_string(),
        reason: "URL cannot carry a path".to_string(),
    })?;
    path.clear().extend(segments);
    Ok(())
}

/// Merge parameters into the existing query.
///
/// Present values overwrite pairs with the same key; `None` leaves the key out.
/// Keys are emitted in sorted order so identical inputs give identical URLs.
fn set_query<const N: usize>(url: &mut Url, params: [(&str, Option<String>); N]) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in params {
        if let Some(value) = value {
            pairs.retain(|(k, _)| k != key);
            pairs.push((key.to_string(), value));
        }
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}
