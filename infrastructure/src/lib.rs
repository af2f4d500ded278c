//! Infrastructure layer for skycast
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenAI-compatible model gateway, the MCP client and
//! server, the OpenWeatherMap client, configuration file loading and the
//! JSONL conversation logger.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod openai;
pub mod weather;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, expand_path};
pub use logging::JsonlConversationLogger;
pub use mcp::{Implementation, McpClient, McpError, McpServer, StdioServerParams};
pub use openai::{OpenAiGateway, OpenAiSettings};
pub use weather::{OpenWeatherClient, OpenWeatherSettings};
