//! Tool provider abstraction
//!
//! A [`ToolProvider`] is anything that can advertise tools and execute them:
//! a remote MCP server reached over stdio, or the weather toolset running
//! in-process.
//!
//! ```text
//!   ChatSession ──list_tools()──▶ ┌──────────────┐
//!                                 │ ToolProvider │──▶ McpClient (stdio child)
//!   ToolInvoker ──call_tool()───▶ └──────────────┘──▶ WeatherToolset (in-process)
//! ```
//!
//! Providers report tool-level failures as a [`ToolCallResult`] with
//! `is_error` set. [`ProviderError`] is reserved for failures of the provider
//! itself (transport, protocol, decoding).

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::entities::ToolDescriptor;
use super::value_objects::ToolCallResult;

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider is not reachable (process exited, pipe closed)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Failed to list tools from the provider
    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The provider answered the call with a protocol-level error
    #[error("Call failed: {0}")]
    CallFailed(String),

    /// The provider's answer could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// No answer within the allotted time
    #[error("Timed out: {0}")]
    Timeout(String),
}

/// Source of tools for the orchestration loop
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Identifier used in logs, e.g. `"mcp:weather"` or `"weather"`.
    fn id(&self) -> &str;

    /// Tools the provider offers. Called once per session.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError>;

    /// Execute one tool with an already-parsed argument object.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolCallResult, ProviderError>;
}
