//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! The tool provider port lives in the domain crate
//! ([`skycast_domain::ToolProvider`]) since both sides of the MCP wire use it.

pub mod conversation_logger;
pub mod llm_gateway;
pub mod progress;
pub mod weather_source;
