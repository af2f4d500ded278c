//! LLM Gateway port
//!
//! Defines the interface for querying a function-calling chat model.

use async_trait::async_trait;
use skycast_domain::{ModelReply, ModelToolSpec, Turn};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolChoice {
    /// The model decides whether to call tools.
    #[default]
    Auto,
    /// Never call tools.
    None,
    /// Must call at least one tool.
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
            ToolChoice::Required => "required",
        }
    }
}

/// One query: the full conversation so far plus the tool catalog.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub turns: &'a [Turn],
    pub tools: &'a [ModelToolSpec],
    pub tool_choice: ToolChoice,
}

impl<'a> ChatRequest<'a> {
    /// Request with automatic tool selection.
    pub fn auto(turns: &'a [Turn], tools: &'a [ModelToolSpec]) -> Self {
        Self {
            turns,
            tools,
            tool_choice: ToolChoice::Auto,
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to the model provider.
/// Implementations (adapters) live in the infrastructure layer. The gateway
/// is stateless: every query carries the whole conversation.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Identifier of the model queries are sent to.
    fn model_name(&self) -> &str;

    /// Send the conversation and tool catalog, get one reply.
    async fn query(&self, request: ChatRequest<'_>) -> Result<ModelReply, GatewayError>;
}
