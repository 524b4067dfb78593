//! HTTP request handlers

use super::protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_REQUEST,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION, PARSE_ERROR,
};
use super::state::AppState;
use crate::search::Credential;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name of the single tool exposed
pub const SEARCH_TOOL: &str = "search";

/// URI of the engine index resource
pub const ENGINES_URI: &str = "serpapi://engines";

/// MCP endpoint with the credential taken from a header or the settings
pub async fn mcp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    handle_mcp(state, None, &headers, &body).await
}

/// MCP endpoint with the credential embedded in the path
pub async fn mcp_with_key(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle_mcp(state, Some(api_key), &headers, &body).await
}

async fn handle_mcp(
    state: AppState,
    path_key: Option<String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let Some(credential) = resolve_credential(&state, path_key.as_deref(), headers) else {
        warn!("Rejecting MCP request without an API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Missing API key. Use /{api_key}/mcp or an Authorization: Bearer header."
            })),
        )
            .into_response();
    };

    let request: JsonRpcRequest = match serde_json::from_slice::<Value>(body) {
        Err(e) => {
            return rpc_failure(Value::Null, JsonRpcError::new(PARSE_ERROR, e.to_string()));
        }
        Ok(value) => match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return rpc_failure(
                    Value::Null,
                    JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                );
            }
        },
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return rpc_failure(
            request.id.unwrap_or(Value::Null),
            JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""),
        );
    }

    if request.is_notification() {
        debug!(method = %request.method, "Notification received");
        return StatusCode::ACCEPTED.into_response();
    }

    debug!(method = %request.method, "MCP request");
    let result = dispatch(&state, &request, &credential).await;
    let id = request.id.unwrap_or(Value::Null);

    match result {
        Ok(result) => Json(JsonRpcResponse::success(id, result)).into_response(),
        Err(error) => rpc_failure(id, error),
    }
}

fn rpc_failure(id: Value, error: JsonRpcError) -> Response {
    Json(JsonRpcResponse::failure(id, error)).into_response()
}

/// Pick the credential from the path, then a bearer token, then the settings
fn resolve_credential(
    state: &AppState,
    path_key: Option<&str>,
    headers: &HeaderMap,
) -> Option<Credential> {
    if let Some(key) = path_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(Credential::new(key));
    }

    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|k| !k.is_empty());
    if let Some(key) = bearer {
        return Some(Credential::new(key));
    }

    state.configured_credential()
}

async fn dispatch(
    state: &AppState,
    request: &JsonRpcRequest,
    credential: &Credential,
) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(initialize(state, request)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": [search_tool(state)] })),
        "tools/call" => call_tool(state, request, credential).await,
        "resources/list" => Ok(list_resources(state)),
        "resources/read" => read_resource(state, request),
        other => Err(JsonRpcError::method_not_found(other)),
    }
}

fn initialize(state: &AppState, request: &JsonRpcRequest) -> Value {
    let version = request
        .param("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(MCP_PROTOCOL_VERSION);

    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false }
        },
        "serverInfo": {
            "name": state.instance_name(),
            "version": crate::VERSION
        }
    })
}

/// Tool descriptor advertised by `tools/list`
fn search_tool(state: &AppState) -> Value {
    json!({
        "name": SEARCH_TOOL,
        "description": "Search the web through SerpApi. Supports every SerpApi engine; \
            results come back grouped into answer_box, knowledge_graph, organic, news, \
            images, shopping and unstructured sections. Engine parameters are listed \
            under the serpapi://engines resources.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "params": {
                    "type": "object",
                    "description": "Engine parameters passed to SerpApi",
                    "properties": {
                        "q": { "type": "string", "description": "Search query" },
                        "engine": {
                            "type": "string",
                            "description": "SerpApi engine",
                            "default": state.search.builder().default_engine()
                        }
                    },
                    "required": ["q"],
                    "additionalProperties": true
                },
                "mode": {
                    "type": "string",
                    "enum": ["complete", "compact"],
                    "default": "complete",
                    "description": "compact keeps only the essential fields of each result"
                },
                "raw": {
                    "type": "boolean",
                    "default": false,
                    "description": "Return the SerpApi payload untouched"
                }
            },
            "required": ["params"]
        }
    })
}

async fn call_tool(
    state: &AppState,
    request: &JsonRpcRequest,
    credential: &Credential,
) -> Result<Value, JsonRpcError> {
    let name = request
        .param("name")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("Missing tool name"))?;

    if name != SEARCH_TOOL {
        return Err(JsonRpcError::invalid_params(format!("Unknown tool: {name}")));
    }

    let arguments = request.param("arguments").cloned().unwrap_or(Value::Null);
    let output = state.search.execute(&arguments, credential).await;

    let structured =
        serde_json::to_value(&output).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;
    let text = serde_json::to_string_pretty(&structured)
        .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;

    // Text for clients that only read content[0], structured for the rest
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
        "isError": output.is_error()
    }))
}

fn list_resources(state: &AppState) -> Value {
    let registry = state.catalogue.snapshot();

    let mut resources = vec![json!({
        "uri": ENGINES_URI,
        "name": "engines",
        "description": "Index of SerpApi engines with parameter schemas",
        "mimeType": "application/json"
    })];
    resources.extend(registry.names().into_iter().map(|engine| {
        json!({
            "uri": format!("{ENGINES_URI}/{engine}"),
            "name": engine,
            "description": format!("Parameter schema for the {engine} engine"),
            "mimeType": "application/json"
        })
    }));

    json!({ "resources": resources })
}

fn read_resource(state: &AppState, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    let uri = request
        .param("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("Missing resource uri"))?;

    let registry = state.catalogue.snapshot();
    let document = if uri == ENGINES_URI {
        registry.index()
    } else {
        let schema = uri
            .strip_prefix(ENGINES_URI)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|engine| registry.get(engine))
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown resource: {uri}")))?;
        serde_json::to_value(schema).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?
    };

    let text = serde_json::to_string_pretty(&document)
        .map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))?;

    Ok(json!({
        "contents": [{ "uri": uri, "mimeType": "application/json", "text": text }]
    }))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "engines": state.catalogue.snapshot().len()
    }))
}

/// Reload the engine catalogue from disk
pub async fn rebuild_engines(State(state): State<AppState>) -> Response {
    let catalogue = Arc::clone(&state.catalogue);

    match tokio::task::spawn_blocking(move || catalogue.rebuild()).await {
        Ok(Ok(count)) => {
            info!("Engine catalogue reloaded ({} engines)", count);
            Json(json!({ "status": "ok", "engines": count })).into_response()
        }
        Ok(Err(e)) => {
            error!("Engine catalogue rebuild failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": format!("{e:#}") })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Engine catalogue rebuild task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
