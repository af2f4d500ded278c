//! Model Context Protocol adapter.
//!
//! Newline-delimited JSON-RPC 2.0 over stdio, both directions:
//!
//! - [`McpClient`] spawns a tool server and implements
//!   [`ToolProvider`](skycast_domain::ToolProvider) on top of it.
//! - [`McpServer`] serves any `ToolProvider` to an MCP client.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::{McpClient, StdioServerParams};
pub use error::{McpError, Result};
pub use protocol::{Implementation, PROTOCOL_VERSION};
pub use server::McpServer;
