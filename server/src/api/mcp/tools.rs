use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde_json::Value as JsonValue;

use crate::core::constants::{APP_NAME, ENV_TEMPO_URL};
use crate::domain::tempo::{TempoService, ToolCallError};

use super::types::*;

type McpError = rmcp::model::ErrorData;

#[derive(Clone)]
pub struct TempoMcpServer {
    tempo: Arc<TempoService>,
    tool_router: ToolRouter<Self>,
}

impl TempoMcpServer {
    pub fn new(tempo: Arc<TempoService>) -> Self {
        let mut tool_router = Self::tool_router();
        describe_default_url(&mut tool_router, tempo.default_url());
        Self { tempo, tool_router }
    }
}

#[tool_handler]
impl ServerHandler for TempoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: APP_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

const INSTRUCTIONS: &str = r#"Grafana Tempo - search and inspect distributed traces.

WORKFLOW:
1. search_tags to discover which attributes are indexed
2. search_tag_values with a tagName (e.g. service.name) to see what values exist
3. search_traces with a TraceQL query such as {resource.service.name="checkout"}
4. get_trace_by_id with a traceID from the search results for the full span tree

TIME ARGUMENTS:
- unix epoch seconds ("1700000000"), RFC 3339 ("2024-01-01T00:00:00Z"),
  relative ("-1h", "-30m" mean that long ago) or "now"
- search_traces defaults to the last hour; the other tools leave the window to Tempo

TIPS:
- Every tool accepts url to query a Tempo other than the configured one
- Keep limit small (5-20) when exploring"#;

#[tool_router]
impl TempoMcpServer {
    #[tool(description = "Search for traces in Grafana Tempo")]
    async fn search_traces(
        &self,
        Parameters(input): Parameters<SearchTracesInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .tempo
            .search_traces(input.into())
            .await
            .map_err(tool_err)?;
        ok_text(text)
    }

    #[tool(description = "Retrieve a specific trace by its trace ID from Grafana Tempo")]
    async fn get_trace_by_id(
        &self,
        Parameters(input): Parameters<TraceByIdInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .tempo
            .get_trace_by_id(input.into())
            .await
            .map_err(tool_err)?;
        ok_text(text)
    }

    #[tool(description = "Search for available tag names in Grafana Tempo")]
    async fn search_tags(
        &self,
        Parameters(input): Parameters<SearchTagsInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .tempo
            .search_tags(input.into())
            .await
            .map_err(tool_err)?;
        ok_text(text)
    }

    #[tool(description = "Search for values of a specific tag in Grafana Tempo")]
    async fn search_tag_values(
        &self,
        Parameters(input): Parameters<SearchTagValuesInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .tempo
            .search_tag_values(input.into())
            .await
            .map_err(tool_err)?;
        ok_text(text)
    }
}

/// Name the configured backend in every tool's `url` argument
fn describe_default_url(router: &mut ToolRouter<TempoMcpServer>, default_url: &str) {
    let description = format!(
        "Tempo server URL (default: {} from {} env var)",
        default_url, ENV_TEMPO_URL
    );
    for route in router.map.values_mut() {
        let mut schema = route.attr.input_schema.as_ref().clone();
        let url_prop = schema
            .get_mut("properties")
            .and_then(|props| props.get_mut(URL_PROPERTY))
            .and_then(JsonValue::as_object_mut);
        if let Some(prop) = url_prop {
            prop.insert(
                "description".to_string(),
                JsonValue::String(description.clone()),
            );
            route.attr.input_schema = Arc::new(schema);
        }
    }
}

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn tool_err(e: ToolCallError) -> McpError {
    tracing::error!(error = %e, "Tempo tool call failed");
    if e.source.is_caller_error() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        McpError::internal_error(e.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use httpmock::prelude::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use crate::core::config::TempoConfig;
    use crate::domain::tempo::AuthContext;
    use crate::domain::tempo::time::resolve_time;

    fn server_for(url: &str) -> TempoMcpServer {
        let tempo = TempoService::new(&TempoConfig {
            url: url.to_string(),
            auth: AuthContext::None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        TempoMcpServer::new(Arc::new(tempo))
    }

    fn text_of(result: &CallToolResult) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_tool_router_lists_four_tools() {
        let server = server_for("http://tempo:3200");
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "get_trace_by_id",
                "search_tag_values",
                "search_tags",
                "search_traces"
            ]
        );
    }

    #[test]
    fn test_url_description_names_configured_backend() {
        let server = server_for("http://tempo:3200");
        for tool in server.tool_router.list_all() {
            let schema = JsonValue::Object(tool.input_schema.as_ref().clone());
            let description = schema["properties"]["url"]["description"]
                .as_str()
                .unwrap_or_default();
            assert_eq!(
                description, "Tempo server URL (default: http://tempo:3200 from TEMPO_URL env var)",
                "tool {}",
                tool.name
            );
        }
    }

    #[test]
    fn test_advertised_time_forms_resolve() {
        for expr in ["1700000000", "2024-01-01T00:00:00Z", "-1h", "-30m", "now"] {
            assert!(
                INSTRUCTIONS.contains(&format!("\"{expr}\"")),
                "{expr} missing from instructions"
            );
            assert!(resolve_time(expr).is_ok(), "{expr} does not resolve");
        }
    }

    #[test]
    fn test_server_info() {
        let info = server_for("http://tempo:3200").get_info();
        assert_eq!(info.server_info.name, APP_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("search_traces"));
    }

    #[tokio::test]
    async fn test_search_traces_tool_returns_text() {
        let mock_server = MockServer::start_async().await;
        mock_server
            .mock_async(|when, then| {
                when.method(GET).path("/api/search");
                then.status(200).json_body(json!({
                    "traces": [{
                        "traceID": "abc123",
                        "rootServiceName": "svc",
                        "rootTraceName": "GET /",
                        "startTimeUnixNano": "1700000000000000000",
                        "durationMs": 42
                    }]
                }));
            })
            .await;

        let server = server_for(&mock_server.base_url());
        let input: SearchTracesInput =
            serde_json::from_value(json!({"query": "{}", "limit": 5.0})).unwrap();
        let result = server.search_traces(Parameters(input)).await.unwrap();

        let text = text_of(&result);
        assert!(text.contains("TraceID: abc123"));
        assert!(text.contains("Duration: 42 ms"));
    }

    #[tokio::test]
    async fn test_bad_time_maps_to_invalid_params() {
        let server = server_for("http://127.0.0.1:9");
        let input: TraceByIdInput =
            serde_json::from_value(json!({"traceID": "abc", "start": "yesterday-ish"})).unwrap();
        let err = server.get_trace_by_id(Parameters(input)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.starts_with("invalid start time:"));
    }

    #[tokio::test]
    async fn test_empty_tag_name_maps_to_invalid_params() {
        let server = server_for("http://127.0.0.1:9");
        let input: SearchTagValuesInput =
            serde_json::from_value(json!({"tagName": ""})).unwrap();
        let err = server.search_tag_values(Parameters(input)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_internal_error() {
        let mock_server = MockServer::start_async().await;
        mock_server
            .mock_async(|when, then| {
                when.method(GET).path("/api/search/tags");
                then.status(500).body("boom");
            })
            .await;

        let server = server_for(&mock_server.base_url());
        let input: SearchTagsInput = serde_json::from_value(json!({})).unwrap();
        let err = server.search_tags(Parameters(input)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message, "tags search failed: HTTP error: 500 - boom");
    }
}
