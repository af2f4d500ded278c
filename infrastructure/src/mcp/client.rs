//! MCP client: the tool provider as seen from the chat side.
//!
//! [`McpClient`] owns one connection to an MCP server, normally a child
//! process speaking newline-delimited JSON-RPC over its stdin/stdout.
//!
//! The read half is owned exclusively by a background reader task that
//! correlates responses with pending requests through `oneshot` channels and
//! answers the few requests a server may send us (`ping`). Writes go through
//! a shared, mutex-guarded writer so the reader task can reply too.

use crate::mcp::error::{McpError, Result};
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut, ListToolsResult,
    PROTOCOL_VERSION, error_codes,
};
use crate::mcp::transport::{MessageKind, classify_message, write_frame};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use skycast_domain::{ProviderError, ToolCallResult, ToolDescriptor, ToolProvider};
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// How long a server gets to exit on its own after stdin is closed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type PendingMap = Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
type SharedWriter = Arc<Mutex<Option<Box<dyn AsyncWrite + Send + Unpin>>>>;

/// How to launch a stdio MCP server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StdioServerParams {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl StdioServerParams {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Short name for logs: the executable's file stem.
    pub fn display_name(&self) -> String {
        Path::new(&self.command)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.command)
            .to_string()
    }
}

/// Connection to one MCP server.
pub struct McpClient {
    id: String,
    server_info: Option<Implementation>,
    startup_timeout: Duration,
    writer: SharedWriter,
    pending: PendingMap,
    closed: Arc<AtomicBool>,
    reader_handle: JoinHandle<()>,
    /// Server process, if we spawned it (killed on Drop to prevent orphans).
    child: std::sync::Mutex<Option<Child>>,
}

impl McpClient {
    /// Spawn `params.command` and perform the MCP handshake.
    ///
    /// The handshake must complete within `startup_timeout`; on failure the
    /// child is killed.
    pub async fn spawn(params: &StdioServerParams, startup_timeout: Duration) -> Result<Self> {
        debug!("Spawning MCP server: {} {:?}", params.command, params.args);

        let mut cmd = Command::new(&params.command);
        cmd.args(&params.args)
            .envs(&params.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::SpawnError(format!("{}: {}", params.command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::SpawnError("Failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::SpawnError("Failed to capture stdout".into()))?;

        let mut client = Self::from_parts(
            params.display_name(),
            stdout,
            stdin,
            Some(child),
            startup_timeout,
        );
        client.handshake().await?;
        Ok(client)
    }

    /// Connect over an already-open pair of streams and perform the handshake.
    pub async fn connect<R, W>(
        name: impl Into<String>,
        reader: R,
        writer: W,
        startup_timeout: Duration,
    ) -> Result<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let mut client = Self::from_parts(name.into(), reader, writer, None, startup_timeout);
        client.handshake().await?;
        Ok(client)
    }

    fn from_parts<R, W>(
        name: String,
        reader: R,
        writer: W,
        child: Option<Child>,
        startup_timeout: Duration,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: SharedWriter = Arc::new(Mutex::new(Some(Box::new(writer))));
        let pending: PendingMap = Arc::new(RwLock::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let reader_handle = tokio::spawn(Self::reader_loop(
            reader,
            Arc::clone(&pending),
            Arc::clone(&writer),
            Arc::clone(&closed),
        ));

        Self {
            id: format!("mcp:{}", name),
            server_info: None,
            startup_timeout,
            writer,
            pending,
            closed,
            reader_handle,
            child: std::sync::Mutex::new(child),
        }
    }

    /// `initialize` followed by `notifications/initialized`.
    async fn handshake(&mut self) -> Result<()> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({}),
            client_info: Implementation::new("skycast", env!("CARGO_PKG_VERSION")),
        };
        let result: InitializeResult = with_timeout(
            "initialize",
            self.startup_timeout,
            self.request_as("initialize", Some(serde_json::to_value(&params)?)),
        )
        .await?;

        if result.protocol_version != PROTOCOL_VERSION {
            warn!(
                "MCP server speaks protocol {}, expected {}",
                result.protocol_version, PROTOCOL_VERSION
            );
        }
        info!(
            "Connected to MCP server {} {}",
            result.server_info.name, result.server_info.version
        );

        self.send(&JsonRpcNotification::new("notifications/initialized", None))
            .await?;
        self.server_info = Some(result.server_info);
        Ok(())
    }

    /// Background reader loop: single owner of the read half.
    ///
    /// Runs until EOF or an I/O error. On exit the connection is marked
    /// closed and every pending request observes a dropped sender.
    async fn reader_loop<R>(reader: R, pending: PendingMap, writer: SharedWriter, closed: Arc<AtomicBool>)
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mut lines = BufReader::new(reader).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("MCP reader: server closed stdout");
                    break;
                }
                Err(e) => {
                    warn!("MCP reader: read error: {}", e);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!("MCP recv: {}", trimmed);

            let json: Value = match serde_json::from_str(trimmed) {
                Ok(v) => v,
                Err(e) => {
                    warn!("MCP reader: skipping non-JSON line ({}): {}", e, trimmed);
                    continue;
                }
            };

            match classify_message(&json) {
                MessageKind::Response => {
                    let Some(id) = json.get("id").and_then(|v| v.as_u64()) else {
                        debug!("MCP reader: response with non-numeric id, dropping");
                        continue;
                    };
                    let response: JsonRpcResponse = match serde_json::from_value(json) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("MCP reader: failed to parse response: {}", e);
                            continue;
                        }
                    };
                    let sender = pending.write().await.remove(&id);
                    match sender {
                        Some(tx) => {
                            let _ = tx.send(response);
                        }
                        None => debug!("MCP reader: no pending receiver for response id={}", id),
                    }
                }

                MessageKind::IncomingRequest { id } => {
                    let method = json.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let reply = if method == "ping" {
                        JsonRpcResponseOut::success(id, json!({}))
                    } else {
                        debug!("MCP reader: rejecting server request method={}", method);
                        JsonRpcResponseOut::error(
                            id,
                            error_codes::METHOD_NOT_FOUND,
                            format!("Method not found: {}", method),
                        )
                    };
                    let mut guard = writer.lock().await;
                    if let Some(w) = guard.as_mut()
                        && let Err(e) = write_frame(w, &reply).await
                    {
                        warn!("MCP reader: failed to answer server request: {}", e);
                    }
                }

                MessageKind::Notification => {
                    trace!(
                        "MCP reader: ignoring notification {}",
                        json.get("method").and_then(|v| v.as_str()).unwrap_or("")
                    );
                }

                MessageKind::Invalid => {
                    warn!("MCP reader: dropping invalid frame: {}", trimmed);
                }
            }
        }

        // Mark closed before clearing so late requesters see it.
        closed.store(true, Ordering::SeqCst);
        pending.write().await.clear();
    }

    async fn send<T: serde::Serialize>(&self, message: &T) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(McpError::TransportClosed)?;
        write_frame(writer, message).await
    }

    /// Send a request and wait for the correlated response's `result`.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::TransportClosed);
        }

        let request = JsonRpcRequest::new(method, params);
        let request_id = request.id;
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(request_id, tx);
        let _slot = PendingSlot {
            pending: Arc::clone(&self.pending),
            id: request_id,
        };

        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::TransportClosed);
        }

        self.send(&request).await?;

        let response = rx.await.map_err(|_| McpError::TransportClosed)?;
        if let Some(error) = response.error {
            return Err(McpError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            McpError::UnexpectedResponse(format!("'{}' response has no result", method))
        })
    }

    async fn request_as<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value.clone()).map_err(|e| McpError::ParseError {
            error: e.to_string(),
            raw: value.to_string(),
        })
    }

    /// Fetch every page of `tools/list`.
    async fn list_all_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let page: ListToolsResult = self.request_as("tools/list", params).await?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!("MCP server {} lists {} tools", self.id, tools.len());
        Ok(tools)
    }

    pub fn server_info(&self) -> Option<&Implementation> {
        self.server_info.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    async fn pending_len(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Close the server's stdin and give it a moment to exit before killing
    /// it.
    pub async fn shutdown(&self) {
        self.writer.lock().await.take();

        let child = self
            .child
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(mut child) = child else {
            return;
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!("MCP server {} exited with {}", self.id, status),
            Ok(Err(e)) => warn!("Failed to wait for MCP server {}: {}", self.id, e),
            Err(_) => {
                warn!("MCP server {} did not exit, killing", self.id);
                let _ = child.kill().await;
            }
        }
    }
}

/// Removes a request's entry from the pending map when the request ends,
/// including when its future is dropped by a caller's timeout.
struct PendingSlot {
    pending: PendingMap,
    id: u64,
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        if let Ok(mut map) = self.pending.try_write() {
            map.remove(&self.id);
            return;
        }
        // The reader holds the lock; finish the removal once it lets go.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let pending = Arc::clone(&self.pending);
            let id = self.id;
            handle.spawn(async move {
                pending.write().await.remove(&id);
            });
        }
    }
}

async fn with_timeout<T>(
    what: &str,
    duration: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| McpError::Timeout(format!("{} after {}s", what, duration.as_secs())))?
}

#[async_trait]
impl ToolProvider for McpClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, ProviderError> {
        with_timeout("tools/list", self.startup_timeout, self.list_all_tools())
            .await
            .map_err(|e| match e {
                McpError::RpcError { .. } | McpError::ParseError { .. } => {
                    ProviderError::DiscoveryFailed(e.to_string())
                }
                other => other.into(),
            })
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> std::result::Result<ToolCallResult, ProviderError> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments: Some(arguments),
        };
        let params = serde_json::to_value(&params).map_err(McpError::from)?;
        let wire: CallToolResult = self.request_as("tools/call", Some(params)).await?;
        Ok(wire.into())
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        self.reader_handle.abort();
        let mut child = self.child.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(child) = child.as_mut() {
            debug!("McpClient dropping, killing server process");
            let _ = child.start_kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, DuplexStream, duplex};

    /// Scripted server side of a duplex pipe: answers each request line with
    /// whatever `respond` returns.
    fn scripted_server(
        stream: DuplexStream,
        respond: impl Fn(&Value) -> Vec<String> + Send + 'static,
    ) -> JoinHandle<Vec<Value>> {
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(stream);
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                let msg: Value = serde_json::from_str(&line).unwrap();
                for out in respond(&msg) {
                    write.write_all(out.as_bytes()).await.unwrap();
                    write.write_all(b"\n").await.unwrap();
                }
                seen.push(msg);
            }
            seen
        })
    }

    fn result_line(msg: &Value, result: Value) -> String {
        json!({"jsonrpc": "2.0", "id": msg["id"], "result": result}).to_string()
    }

    fn initialize_result() -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "scripted", "version": "0.0.1"}
        })
    }

    async fn connect(server: DuplexStream) -> McpClient {
        let (read, write) = tokio::io::split(server);
        McpClient::connect("scripted", read, write, Duration::from_secs(5))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_handshake_and_paginated_listing() {
        let (client_end, server_end) = duplex(64 * 1024);
        let server = scripted_server(server_end, |msg| match msg["method"].as_str() {
            Some("initialize") => vec![result_line(msg, initialize_result())],
            Some("tools/list") if msg["params"]["cursor"].is_null() => vec![result_line(
                msg,
                json!({"tools": [{"name": "a", "inputSchema": {"type": "object"}}], "nextCursor": "2"}),
            )],
            Some("tools/list") => vec![result_line(
                msg,
                json!({"tools": [{"name": "b", "description": "B"}]}),
            )],
            _ => vec![],
        });

        let client = connect(client_end).await;
        assert_eq!(client.id(), "mcp:scripted");
        assert_eq!(client.server_info().unwrap().name, "scripted");

        let tools = client.list_tools().await.unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        drop(client);
        let seen = server.await.unwrap();
        assert_eq!(seen[0]["method"], "initialize");
        assert_eq!(seen[0]["params"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(seen[0]["params"]["clientInfo"]["name"], "skycast");
        assert_eq!(seen[1]["method"], "notifications/initialized");
        assert!(seen[1].get("id").is_none());
        assert_eq!(seen[3]["params"]["cursor"], "2");
    }

    #[tokio::test]
    async fn test_answers_server_ping_and_skips_noise() {
        let (client_end, server_end) = duplex(64 * 1024);
        let server = scripted_server(server_end, |msg| match msg["method"].as_str() {
            Some("initialize") => vec![result_line(msg, initialize_result())],
            Some("tools/call") => vec![
                "server starting up...".to_string(),
                json!({"jsonrpc": "2.0", "id": "srv-1", "method": "ping"}).to_string(),
                json!({"jsonrpc": "2.0", "id": "srv-2", "method": "sampling/createMessage"})
                    .to_string(),
                result_line(msg, json!({"content": [{"type": "text", "text": "12°C"}]})),
            ],
            _ => vec![],
        });

        let client = connect(client_end).await;
        let result = client.call_tool("get_current_weather", Map::new()).await.unwrap();
        assert_eq!(result.first_text(), Some("12°C"));

        drop(client);
        let seen = server.await.unwrap();
        let ping_reply = seen.iter().find(|m| m["id"] == "srv-1").unwrap();
        assert_eq!(ping_reply["result"], json!({}));
        let rejected = seen.iter().find(|m| m["id"] == "srv-2").unwrap();
        assert_eq!(rejected["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rpc_error_maps_to_call_failed() {
        let (client_end, server_end) = duplex(64 * 1024);
        let _server = scripted_server(server_end, |msg| match msg["method"].as_str() {
            Some("initialize") => vec![result_line(msg, initialize_result())],
            Some("tools/call") => vec![
                json!({"jsonrpc": "2.0", "id": msg["id"], "error": {"code": -32602, "message": "bad args"}})
                    .to_string(),
            ],
            _ => vec![],
        });

        let client = connect(client_end).await;
        let err = client.call_tool("x", Map::new()).await.unwrap_err();
        assert!(matches!(err, ProviderError::CallFailed(ref m) if m.contains("bad args")));
    }

    #[tokio::test]
    async fn test_pending_call_fails_when_server_goes_away() {
        let (client_end, server_end) = duplex(64 * 1024);
        let server = tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(server_end);
            let mut lines = BufReader::new(read).lines();
            // Answer initialize, then hang up on the first call.
            while let Ok(Some(line)) = lines.next_line().await {
                let msg: Value = serde_json::from_str(&line).unwrap();
                match msg["method"].as_str() {
                    Some("initialize") => {
                        write
                            .write_all(format!("{}\n", result_line(&msg, initialize_result())).as_bytes())
                            .await
                            .unwrap();
                    }
                    Some("tools/call") => break,
                    _ => {}
                }
            }
        });

        let client = connect(client_end).await;
        let call = client.call_tool("get_forecast", Map::new());
        let (result, _) = tokio::join!(call, server);
        assert!(matches!(result, Err(ProviderError::NotAvailable(_))));
        assert!(client.is_closed());

        let again = client.call_tool("get_forecast", Map::new()).await;
        assert!(matches!(again, Err(ProviderError::NotAvailable(_))));
    }

    #[tokio::test]
    async fn test_abandoned_calls_leave_no_pending_entries() {
        let (client_end, server_end) = duplex(64 * 1024);
        // Never answers a tool call.
        let _server = scripted_server(server_end, |msg| match msg["method"].as_str() {
            Some("initialize") => vec![result_line(msg, initialize_result())],
            _ => vec![],
        });

        let client = connect(client_end).await;
        for _ in 0..10 {
            let call = client.call_tool("get_forecast", Map::new());
            let result = tokio::time::timeout(Duration::from_millis(20), call).await;
            assert!(result.is_err());
        }
        tokio::task::yield_now().await;
        assert_eq!(client.pending_len().await, 0);
        assert!(!client.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_times_out() {
        let (client_end, _server_end) = duplex(64 * 1024);
        let (read, write) = tokio::io::split(client_end);
        let result = McpClient::connect("silent", read, write, Duration::from_secs(10)).await;
        assert!(matches!(result, Err(McpError::Timeout(ref m)) if m.contains("initialize")));
    }

    #[test]
    fn test_display_name_is_file_stem() {
        let params = StdioServerParams::new("/usr/local/bin/skycast-weather-server").with_args(["-v"]);
        assert_eq!(params.display_name(), "skycast-weather-server");
        assert_eq!(params.args, vec!["-v".to_string()]);
    }
}
