//! JSON-RPC and MCP message types.
//!
//! MCP runs JSON-RPC 2.0 over the server's stdin/stdout, one JSON object per
//! line.
//!
//! # Protocol Overview
//!
//! - **Requests**: client → server (`initialize`, `tools/list`, `tools/call`,
//!   `ping`), and occasionally server → client (`ping`)
//! - **Responses**: result or error, correlated by `id`
//! - **Notifications**: no `id`, no response (`notifications/initialized`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skycast_domain::{ToolCallResult, ToolContent, ToolDescriptor};
use std::sync::atomic::{AtomicU64, Ordering};

/// MCP protocol revision spoken by both client and server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Global request ID counter for JSON-RPC requests.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a unique request ID.
fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request (client side)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no `id`, never answered)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response as received by the client
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

/// JSON-RPC response as sent back to the peer.
///
/// `id` is echoed verbatim (number, string or `null` for parse errors).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponseOut {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponseOut {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Name and version of a client or server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// `initialize` request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Implementation,
}

/// `initialize` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// `tools/list` result page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// `tools/call` request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// `tools/call` result as it appears on the wire
///
/// Content elements are kept as raw JSON; only `text` elements are
/// interpreted, other element types keep just their `type` tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl From<CallToolResult> for ToolCallResult {
    fn from(wire: CallToolResult) -> Self {
        let content = wire
            .content
            .iter()
            .map(|element| {
                let kind = element.get("type").and_then(Value::as_str).unwrap_or("");
                match (kind, element.get("text").and_then(Value::as_str)) {
                    ("text", Some(text)) => ToolContent::Text(text.to_string()),
                    _ => ToolContent::NonText {
                        kind: kind.to_string(),
                    },
                }
            })
            .collect();
        ToolCallResult {
            content,
            is_error: wire.is_error.unwrap_or(false),
        }
    }
}

impl From<&ToolCallResult> for CallToolResult {
    fn from(result: &ToolCallResult) -> Self {
        let content = result
            .content
            .iter()
            .map(|element| match element {
                ToolContent::Text(text) => serde_json::json!({ "type": "text", "text": text }),
                ToolContent::NonText { kind } => serde_json::json!({ "type": kind }),
            })
            .collect();
        Self {
            content,
            is_error: Some(result.is_error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new("tools/list", None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "tools/list");
        assert!(value.get("params").is_none());
        assert!(value["id"].as_u64().is_some());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = JsonRpcRequest::new("ping", None);
        let b = JsonRpcRequest::new("ping", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_error_response_out() {
        let response = JsonRpcResponseOut::error(Value::Null, error_codes::PARSE_ERROR, "Parse error");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32700);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_list_tools_result_deserializes() {
        let result: ListToolsResult = serde_json::from_value(json!({
            "tools": [
                {"name": "get_forecast", "description": "Forecast", "inputSchema": {"type": "object"}},
                {"name": "ping"}
            ],
            "nextCursor": "page-2"
        }))
        .unwrap();
        assert_eq!(result.tools.len(), 2);
        assert_eq!(result.tools[1].description, None);
        assert_eq!(result.next_cursor.as_deref(), Some("page-2"));
    }

    #[test]
    fn test_call_tool_result_to_domain() {
        let wire: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "image", "data": "...", "mimeType": "image/png"},
                {"type": "text", "text": "Sunny"}
            ]
        }))
        .unwrap();
        let result = ToolCallResult::from(wire);
        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("Sunny"));
        assert_eq!(
            result.content[0],
            ToolContent::NonText {
                kind: "image".to_string()
            }
        );
    }

    #[test]
    fn test_domain_result_to_wire() {
        let wire = CallToolResult::from(&ToolCallResult::error("City not found"));
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "City not found"}], "isError": true})
        );
    }
}
