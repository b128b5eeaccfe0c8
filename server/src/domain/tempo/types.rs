//! Tempo request parameters and response records
//!
//! Response records mirror the JSON that Tempo's HTTP API returns. Everything is
//! request-scoped: built from tool arguments, filled from one response, dropped
//! once the text has been rendered.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// Query Parameters
// =============================================================================

/// Parameters for `GET /api/search`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTracesParams {
    pub query: String,
    pub start: i64,
    pub end: i64,
    pub limit: i64,
}

/// Parameters for `GET /api/traces/{traceID}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceByIdParams {
    pub trace_id: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// Parameters for `GET /api/search/tags`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTagsParams {
    pub scope: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<i64>,
    pub max_stale_values: Option<i64>,
}

/// Parameters for `GET /api/search/tag/{tagName}/values`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTagValuesParams {
    pub tag_name: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<i64>,
    pub max_stale_values: Option<i64>,
}

// =============================================================================
// Authentication
// =============================================================================

/// Credentials attached to every backend request
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthContext {
    #[default]
    None,
    Bearer(String),
    Basic {
        username: String,
        password: String,
    },
}

impl AuthContext {
    /// Pick one scheme from whatever is configured; a token wins over basic
    /// credentials, and basic applies when either half is non-empty.
    pub fn resolve(token: Option<&str>, username: Option<&str>, password: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(token) = non_empty(token) {
            return Self::Bearer(token);
        }
        let username = non_empty(username);
        let password = non_empty(password);
        if username.is_none() && password.is_none() {
            return Self::None;
        }
        Self::Basic {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer(_) => "bearer",
            Self::Basic { .. } => "basic",
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

// =============================================================================
// Trace Search
// =============================================================================

/// Body of `GET /api/search`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TraceSearchResult {
    #[serde(default)]
    pub traces: Vec<TraceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JsonValue>,
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_status: Option<String>,
}

/// One search hit
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    #[serde(default, rename = "traceID")]
    pub trace_id: String,
    #[serde(default)]
    pub root_service_name: String,
    #[serde(default)]
    pub root_trace_name: String,
    #[serde(default)]
    pub start_time_unix_nano: String,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_set: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

// =============================================================================
// Trace Detail
// =============================================================================

/// Body of `GET /api/traces/{traceID}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TraceDetail {
    #[serde(default, alias = "resourceSpans", skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<Batch>,
}

/// Spans sharing one resource (one originating service instance)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub resource: Resource,
    #[serde(
        default,
        alias = "instrumentationLibrarySpans",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub scope_spans: Vec<ScopeSpans>,
}

impl Batch {
    /// `service.name` resource attribute, when present as a non-empty string
    pub fn service_name(&self) -> Option<&str> {
        self.resource
            .attributes
            .iter()
            .filter(|attr| attr.key == "service.name")
            .filter_map(|attr| attr.value.as_str())
            .filter(|s| !s.is_empty())
            .last()
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.scope_spans.iter().flat_map(|ss| ss.spans.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

/// Instrumentation scope with its spans
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScopeSpans {
    #[serde(default, alias = "instrumentationLibrary")]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Scope {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub span_id: String,
    /// Empty for root spans
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_span_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "String::is_empty"
    )]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_time_unix_nano: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_time_unix_nano: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Status {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "String::is_empty"
    )]
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_unix_nano: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Attribute {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: AttributeValue,
}

// =============================================================================
// Attribute Values
// =============================================================================

/// OTLP `AnyValue` as Tempo emits it.
///
/// `intValue` arrives either as a JSON string (proto3 JSON mapping of int64) or
/// as a JSON number; both decode to `Integer`. Shapes this tool does not render
/// (bool, double, kvlist, bytes, empty) are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Array(Vec<AttributeValue>),
    Other(JsonValue),
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::Other(JsonValue::Object(Default::default()))
    }
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text shown in reports: a non-empty string, else the integer, else nothing
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::String(s) if !s.is_empty() => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }

    fn from_json(value: JsonValue) -> Self {
        let JsonValue::Object(mut map) = value else {
            return Self::Other(value);
        };

        if let Some(JsonValue::String(s)) = map.get("stringValue")
            && !s.is_empty()
        {
            return Self::String(s.clone());
        }

        if let Some(int) = map.get("intValue") {
            let parsed = match int {
                JsonValue::String(s) => s.trim().parse::<i64>().ok(),
                JsonValue::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                _ => None,
            };
            if let Some(i) = parsed {
                return Self::Integer(i);
            }
        }

        if let Some(JsonValue::String(s)) = map.get("stringValue") {
            return Self::String(s.clone());
        }

        if let Some(JsonValue::Object(array)) = map.get_mut("arrayValue") {
            let values = match array.remove("values") {
                Some(JsonValue::Array(values)) => values,
                _ => Vec::new(),
            };
            return Self::Array(values.into_iter().map(Self::from_json).collect());
        }

        Self::Other(JsonValue::Object(map))
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        if !value.is_object() && !value.is_null() {
            return Err(de::Error::invalid_type(
                de::Unexpected::Other("non-object attribute value"),
                &"an OTLP AnyValue object",
            ));
        }
        Ok(Self::from_json(value))
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("stringValue", s)?;
                map.end()
            }
            Self::Integer(i) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("intValue", &i.to_string())?;
                map.end()
            }
            Self::Array(values) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("arrayValue", &ArrayValueRef { values })?;
                map.end()
            }
            Self::Other(raw) => raw.serialize(serializer),
        }
    }
}

#[derive(Serialize)]
struct ArrayValueRef<'a> {
    values: &'a [AttributeValue],
}

/// Accept a JSON string or number (or null) and keep its text
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::invalid_type(
            de::Unexpected::Other(&other.to_string()),
            &"a string or number",
        )),
    }
}

// =============================================================================
// Tag Lookups
// =============================================================================

/// Body of `GET /api/search/tags`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNamesResult {
    #[serde(default)]
    pub tag_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JsonValue>,
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_status: Option<String>,
}

/// Body of `GET /api/search/tag/{tagName}/values`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagValuesResult {
    #[serde(default)]
    pub tag_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JsonValue>,
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_status: Option<String>,
}
