use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::dispatch::{dispatch, tool_definitions, ToolOutput};
use crate::AppState;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "swap-analyzer";

// JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// `POST /mcp`: one JSON-RPC 2.0 request per body.
pub async fn handle(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return Json(RpcResponse::error(Value::Null, PARSE_ERROR, e.to_string())).into_response()
        }
    };
    let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return Json(RpcResponse::error(id_hint, INVALID_REQUEST, e.to_string())).into_response()
        }
    };
    if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
        return Json(RpcResponse::error(
            id_hint,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ))
        .into_response();
    }

    let Some(id) = request.id.clone() else {
        tracing::debug!(method = %request.method, "Notification received");
        return StatusCode::ACCEPTED.into_response();
    };

    Json(respond(&state, id, request).await).into_response()
}

async fn respond(state: &AppState, id: Value, request: RpcRequest) -> RpcResponse {
    match request.method.as_str() {
        "initialize" => RpcResponse::result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "ping" => RpcResponse::result(id, json!({})),
        "tools/list" => RpcResponse::result(id, json!({ "tools": tool_definitions() })),
        "tools/call" => {
            let params: CallParams = match serde_json::from_value(request.params) {
                Ok(p) => p,
                Err(e) => {
                    return RpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}"))
                }
            };

            let cancel = state.request_token();
            match dispatch(state, &params.name, params.arguments, &cancel).await {
                Ok(output) => RpcResponse::result(id, tool_result(output)),
                Err(e) => RpcResponse::error(id, INVALID_PARAMS, e.to_string()),
            }
        }
        other => RpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    }
}

/// Wrap a payload in the text content envelope.
fn tool_result(output: ToolOutput) -> Value {
    let text = serde_json::to_string_pretty(&output.payload)
        .unwrap_or_else(|_| output.payload.to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": output.is_error,
    })
}

/// `GET /api/tools`: the same listing as `tools/list`.
pub async fn list_tools() -> impl IntoResponse {
    Json(json!({ "tools": tool_definitions() }))
}
