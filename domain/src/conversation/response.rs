//! Model reply types for the function-calling chat API.
//!
//! A function-calling model answers a query in one of two ways:
//!
//! ```text
//! query(turns, tools) ──▶ ModelReply { content: Some(text), tool_calls: [] }   final answer
//!                     └─▶ ModelReply { content: None,       tool_calls: [..] } tool requests
//! ```
//!
//! Both fields may be populated at once (some models narrate before calling
//! a tool). The orchestration loop only looks at `tool_calls` to decide
//! whether another round is needed.

use crate::tool::entities::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of the message.
    Stop,
    /// The model wants tools invoked.
    ToolCalls,
    /// Hit the token limit; content may be truncated.
    Length,
    /// Output withheld by the provider's content filter.
    ContentFilter,
    /// Provider-specific reason.
    Other(String),
}

impl FinishReason {
    pub fn parse(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "tool_calls" | "function_call" => FinishReason::ToolCalls,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// One response from the model provider.
///
/// # Examples
///
/// ```
/// use skycast_domain::conversation::response::ModelReply;
/// use skycast_domain::ToolCallRequest;
///
/// let reply = ModelReply::from_text("It is sunny.");
/// assert!(!reply.has_tool_calls());
///
/// let reply = ModelReply::from_tool_calls(vec![ToolCallRequest::new(
///     "call_1",
///     "get_current_weather",
///     r#"{"city":"Lisbon"}"#,
/// )]);
/// assert!(reply.has_tool_calls());
/// assert!(reply.content.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelReply {
    /// Assistant text, absent when the model only requests tools.
    pub content: Option<String>,
    /// Tool invocations, in the order the model listed them.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why the model stopped generating.
    pub finish_reason: Option<FinishReason>,
    /// Model identifier reported by the provider.
    pub model: Option<String>,
}

impl ModelReply {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            tool_calls: Vec::new(),
            finish_reason: Some(FinishReason::Stop),
            model: None,
        }
    }

    pub fn from_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: Some(FinishReason::ToolCalls),
            model: None,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Content if present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|s| !s.is_empty())
    }
}
