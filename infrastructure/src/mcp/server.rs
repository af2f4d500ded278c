//! MCP server: exposes any [`ToolProvider`] over stdio.
//!
//! Reads one JSON-RPC frame per line, answers requests in order, and stops
//! when the input reaches EOF. Diagnostics go through `tracing` only; stdout
//! belongs to the protocol.

use crate::mcp::error::Result;
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JsonRpcResponseOut, ListToolsResult, PROTOCOL_VERSION, error_codes,
};
use crate::mcp::transport::{MessageKind, classify_message, write_frame};
use serde::Serialize;
use serde_json::{Value, json};
use skycast_domain::{ToolCallResult, ToolProvider};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, info, warn};

pub struct McpServer {
    provider: Arc<dyn ToolProvider>,
    info: Implementation,
    instructions: Option<String>,
}

impl McpServer {
    pub fn new(provider: Arc<dyn ToolProvider>, info: Implementation) -> Self {
        Self {
            provider,
            info,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Serve until `reader` reaches EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server '{}' ready on stdio", self.info.name);
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(&line).await {
                write_frame(&mut writer, &reply).await?;
            }
        }

        info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Handle one incoming frame. Notifications and stray responses produce
    /// no reply.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponseOut> {
        let json: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparsable frame: {}", e);
                return Some(JsonRpcResponseOut::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        match classify_message(&json) {
            MessageKind::IncomingRequest { id } => {
                let method = json.get("method").and_then(|v| v.as_str()).unwrap_or("");
                Some(self.handle_request(id, method, json.get("params")).await)
            }
            MessageKind::Notification => {
                debug!(
                    "Notification: {}",
                    json.get("method").and_then(|v| v.as_str()).unwrap_or("")
                );
                None
            }
            MessageKind::Response => {
                debug!("Ignoring response frame from client");
                None
            }
            MessageKind::Invalid => Some(JsonRpcResponseOut::error(
                json.get("id").cloned().unwrap_or(Value::Null),
                error_codes::INVALID_REQUEST,
                "Invalid Request",
            )),
        }
    }

    async fn handle_request(&self, id: Value, method: &str, params: Option<&Value>) -> JsonRpcResponseOut {
        debug!("Request {}: {}", id, method);
        match method {
            "initialize" => {
                if let Some(client) = params
                    .and_then(|p| serde_json::from_value::<InitializeParams>(p.clone()).ok())
                {
                    info!(
                        "Client {} {} connected (protocol {})",
                        client.client_info.name, client.client_info.version, client.protocol_version
                    );
                }
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: json!({ "tools": { "listChanged": false } }),
                    server_info: self.info.clone(),
                    instructions: self.instructions.clone(),
                };
                success(id, &result)
            }

            "ping" => JsonRpcResponseOut::success(id, json!({})),

            "tools/list" => match self.provider.list_tools().await {
                Ok(tools) => success(
                    id,
                    &ListToolsResult {
                        tools,
                        next_cursor: None,
                    },
                ),
                Err(e) => JsonRpcResponseOut::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
            },

            "tools/call" => {
                let params: CallToolParams =
                    match params.map(|p| serde_json::from_value(p.clone())) {
                        Some(Ok(p)) => p,
                        Some(Err(e)) => {
                            return JsonRpcResponseOut::error(
                                id,
                                error_codes::INVALID_PARAMS,
                                format!("Invalid params: {}", e),
                            );
                        }
                        None => {
                            return JsonRpcResponseOut::error(
                                id,
                                error_codes::INVALID_PARAMS,
                                "Invalid params: missing tool name",
                            );
                        }
                    };
                let result = self.call_tool(params).await;
                success(id, &CallToolResult::from(&result))
            }

            other => JsonRpcResponseOut::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        }
    }

    async fn call_tool(&self, params: CallToolParams) -> ToolCallResult {
        let known = match self.provider.list_tools().await {
            Ok(tools) => tools.iter().any(|t| t.name == params.name),
            Err(e) => return ToolCallResult::error(e.to_string()),
        };
        if !known {
            warn!("Call to unknown tool '{}'", params.name);
            return ToolCallResult::error(format!("Unknown tool: {}", params.name));
        }

        info!("Calling tool '{}'", params.name);
        match self
            .provider
            .call_tool(&params.name, params.arguments.unwrap_or_default())
            .await
        {
            Ok(result) => result,
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }
}

fn success<T: Serialize>(id: Value, result: &T) -> JsonRpcResponseOut {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponseOut::success(id, value),
        Err(e) => JsonRpcResponseOut::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}
