//! Wire types for the OpenAI-compatible chat-completions API.
//!
//! Only the fields skycast reads or writes are modelled; unknown response
//! fields are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use skycast_domain::{FinishReason, ModelReply, ModelToolSpec, Role, ToolCallRequest, Turn};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "no_tools")]
    pub tools: &'a [ModelToolSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn no_tools(tools: &&[ModelToolSpec]) -> bool {
    tools.is_empty()
}

/// One message in `messages`, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    /// `null` for assistant messages that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,
    /// Some servers send `null` instead of omitting the field.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WireToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WireToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: WireMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        let content = match turn.role {
            // Tool-call-only assistant turns are sent with null content.
            Role::Assistant if turn.content.as_deref().is_none_or(str::is_empty) => None,
            _ => Some(turn.text().to_string()),
        };
        Self {
            role: turn.role.as_str().to_string(),
            content,
            tool_calls: turn
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_kind(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: turn.tool_call_id.clone(),
        }
    }
}

impl Choice {
    pub fn into_reply(self, model: Option<String>) -> ModelReply {
        let tool_calls = self
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCallRequest::new(call.id, call.function.name, call.function.arguments))
            .collect();
        ModelReply {
            content: self.message.content,
            tool_calls,
            finish_reason: self.finish_reason.as_deref().map(FinishReason::parse),
            model,
        }
    }
}
