//! Line transport for MCP over stdio.
//!
//! Each JSON-RPC frame is one line of UTF-8 JSON terminated by `\n`.
//! [`classify_message`] tells the client's reader task and the server's
//! dispatch loop what kind of frame they are looking at.

use crate::mcp::error::Result;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response,
    /// A request from the peer (has `id` + `method`), e.g. a server `ping`.
    IncomingRequest { id: Value },
    /// A notification (has `method`, no `id`).
    Notification,
    /// Neither `id` nor `method`; not a valid JSON-RPC frame.
    Invalid,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &Value) -> MessageKind {
    let id = json.get("id").filter(|v| !v.is_null());
    let has_method = json.get("method").and_then(|v| v.as_str()).is_some();

    match (id, has_method) {
        (Some(id), true) => MessageKind::IncomingRequest { id: id.clone() },
        (Some(_), false) => MessageKind::Response,
        (None, true) => MessageKind::Notification,
        (None, false) => MessageKind::Invalid,
    }
}

/// Serialize `message` and write it as a single newline-terminated frame.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize,
{
    let mut json = serde_json::to_string(message)?;
    trace!("MCP send: {}", json);
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
