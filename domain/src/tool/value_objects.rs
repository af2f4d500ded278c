//! Tool domain value objects: raw provider results and normalized outcomes
//!
//! A provider answers a call with a [`ToolCallResult`] (a list of content
//! elements plus an error flag). The invoker reduces that to a
//! [`ToolInvocationOutcome`], which in turn reduces to the single text
//! payload stored in the tool turn:
//!
//! | Provider result | Outcome | Tool turn text |
//! |-----------------|---------|----------------|
//! | ≥1 text element | `Success(first)` | the text |
//! | no elements | `EmptyResult` | [`EMPTY_RESULT`] |
//! | `isError`, transport error, timeout | `Failure(msg)` | `Error calling tool: msg` |

/// Placeholder description for tools that advertise none.
pub const MISSING_DESCRIPTION: &str = "Tool without description";

/// Tool turn text for a call that returned no content elements.
pub const EMPTY_RESULT: &str = "Tool executed, but returned an empty result";

/// Prefix of every failed tool turn.
pub const FAILURE_PREFIX: &str = "Error calling tool";

/// One element of a tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolContent {
    Text(String),
    /// Image, audio, embedded resource, ... Only the type tag is kept.
    NonText { kind: String },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolContent::Text(text) => Some(text),
            ToolContent::NonText { .. } => None,
        }
    }
}

/// Raw result of a tool call as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl ToolCallResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ToolContent::as_text)
    }
}

/// Normalized outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocationOutcome {
    Success(String),
    EmptyResult,
    Failure(String),
}

impl ToolInvocationOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        ToolInvocationOutcome::Failure(message.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ToolInvocationOutcome::Failure(_))
    }

    /// Text stored in the tool turn.
    pub fn into_turn_text(self) -> String {
        match self {
            ToolInvocationOutcome::Success(text) => text,
            ToolInvocationOutcome::EmptyResult => EMPTY_RESULT.to_string(),
            ToolInvocationOutcome::Failure(message) => format!("{FAILURE_PREFIX}: {message}"),
        }
    }
}

impl From<ToolCallResult> for ToolInvocationOutcome {
    fn from(result: ToolCallResult) -> Self {
        if result.is_error {
            let message = result
                .first_text()
                .filter(|t| !t.is_empty())
                .unwrap_or("tool reported an error");
            return ToolInvocationOutcome::failure(message);
        }
        if result.content.is_empty() {
            return ToolInvocationOutcome::EmptyResult;
        }
        match result.first_text() {
            Some(text) => ToolInvocationOutcome::Success(text.to_string()),
            None => ToolInvocationOutcome::failure("tool returned no text content"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_element_wins() {
        let result = ToolCallResult {
            content: vec![
                ToolContent::NonText {
                    kind: "image".to_string(),
                },
                ToolContent::text("12°C, clear sky"),
                ToolContent::text("ignored"),
            ],
            is_error: false,
        };
        assert_eq!(
            ToolInvocationOutcome::from(result),
            ToolInvocationOutcome::Success("12°C, clear sky".to_string())
        );
    }

    #[test]
    fn test_zero_elements_is_empty_result() {
        let outcome = ToolInvocationOutcome::from(ToolCallResult::empty());
        assert_eq!(outcome, ToolInvocationOutcome::EmptyResult);
        assert_eq!(outcome.into_turn_text(), EMPTY_RESULT);
    }

    #[test]
    fn test_error_flag_is_failure() {
        let outcome = ToolInvocationOutcome::from(ToolCallResult::error("city not found"));
        assert_eq!(
            outcome.clone().into_turn_text(),
            "Error calling tool: city not found"
        );
        assert!(outcome.is_failure());

        let bare = ToolCallResult {
            content: vec![],
            is_error: true,
        };
        assert_eq!(
            ToolInvocationOutcome::from(bare),
            ToolInvocationOutcome::failure("tool reported an error")
        );
    }

    #[test]
    fn test_non_text_only_is_failure() {
        let result = ToolCallResult {
            content: vec![ToolContent::NonText {
                kind: "audio".to_string(),
            }],
            is_error: false,
        };
        assert!(ToolInvocationOutcome::from(result).is_failure());
    }
}
