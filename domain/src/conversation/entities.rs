//! Conversation domain entities

use crate::tool::entities::ToolCallRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single entry in the conversation log (Entity)
///
/// `content` is only `None` for assistant turns that carry tool calls.
/// `tool_calls` is only populated on assistant turns and `tool_call_id`
/// only on tool turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Text content, or `""` when absent.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn requests_tools(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

/// Errors raised when an append would break the conversation invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("tool result '{id}' does not follow an assistant turn with tool calls")]
    NoPendingToolCalls { id: String },

    #[error("tool result '{got}' out of order, expected '{expected}'")]
    UnexpectedToolCallId { expected: String, got: String },
}

/// Ordered, append-only log of turns
///
/// History is replayed in full to the model on every query. Tool turns are
/// only accepted when they answer, in order, the requests of the latest
/// assistant turn.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Start a conversation that opens with a system prompt.
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.append_system(prompt);
        conversation
    }

    pub fn append_system(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::system(content));
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::user(content));
    }

    pub fn append_assistant(&mut self, content: Option<String>, tool_calls: Vec<ToolCallRequest>) {
        self.turns.push(Turn::assistant(content, tool_calls));
    }

    /// Append the result of one tool call.
    ///
    /// `tool_call_id` must be the next unanswered request of the most recent
    /// assistant turn.
    pub fn append_tool(
        &mut self,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        let id = tool_call_id.into();
        match self.pending_tool_calls().first() {
            Some(expected) if expected.id == id => {
                self.turns.push(Turn::tool(id, content));
                Ok(())
            }
            Some(expected) => Err(ConversationError::UnexpectedToolCallId {
                expected: expected.id.clone(),
                got: id,
            }),
            None => Err(ConversationError::NoPendingToolCalls { id }),
        }
    }

    /// Requests of the latest assistant turn that have no tool turn yet.
    pub fn pending_tool_calls(&self) -> &[ToolCallRequest] {
        let Some(index) = self.turns.iter().rposition(|t| t.role == Role::Assistant) else {
            return &[];
        };
        let answered = self.turns[index + 1..]
            .iter()
            .take_while(|t| t.role == Role::Tool)
            .count();
        let calls = &self.turns[index].tool_calls;
        // Any non-tool turn after the assistant turn closes it.
        if index + 1 + answered != self.turns.len() {
            return &[];
        }
        calls.get(answered..).unwrap_or(&[])
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of turns with the given role.
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, "get_current_weather", r#"{"city":"Oslo"}"#)
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Tool).unwrap(), "tool");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_append_plain_turns() {
        let mut conversation = Conversation::with_system_prompt("be helpful");
        conversation.append_user("weather in Oslo?");
        conversation.append_assistant(Some("Sunny".to_string()), vec![]);

        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.turns()[0].role, Role::System);
        assert_eq!(conversation.turns()[1].text(), "weather in Oslo?");
        assert!(!conversation.turns()[2].requests_tools());
    }

    #[test]
    fn test_tool_turns_follow_requests_in_order() {
        let mut conversation = Conversation::new();
        conversation.append_user("compare");
        conversation.append_assistant(None, vec![call("a"), call("b")]);

        assert_eq!(conversation.pending_tool_calls().len(), 2);
        conversation.append_tool("a", "first").unwrap();
        assert_eq!(conversation.pending_tool_calls()[0].id, "b");
        conversation.append_tool("b", "second").unwrap();
        assert!(conversation.pending_tool_calls().is_empty());
        assert_eq!(conversation.count_role(Role::Tool), 2);
    }

    #[test]
    fn test_out_of_order_tool_turn_rejected() {
        let mut conversation = Conversation::new();
        conversation.append_assistant(None, vec![call("a"), call("b")]);

        let err = conversation.append_tool("b", "second").unwrap_err();
        assert_eq!(
            err,
            ConversationError::UnexpectedToolCallId {
                expected: "a".to_string(),
                got: "b".to_string(),
            }
        );
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_tool_turn_without_request_rejected() {
        let mut conversation = Conversation::new();
        conversation.append_user("hi");
        assert!(matches!(
            conversation.append_tool("x", "result"),
            Err(ConversationError::NoPendingToolCalls { .. })
        ));

        conversation.append_assistant(None, vec![call("a")]);
        conversation.append_tool("a", "done").unwrap();
        // All requests answered: an extra result has nothing to attach to.
        assert!(conversation.append_tool("a", "again").is_err());
    }

    #[test]
    fn test_user_turn_closes_pending_requests() {
        let mut conversation = Conversation::new();
        conversation.append_assistant(None, vec![call("a")]);
        conversation.append_user("never mind");
        assert!(conversation.pending_tool_calls().is_empty());
    }
}
