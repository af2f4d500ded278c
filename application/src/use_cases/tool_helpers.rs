//! Shared helpers for tool use cases.

use serde_json::{Map, Value};
use skycast_domain::ToolCallRequest;

/// Parse the raw argument payload the model emitted.
///
/// A blank payload means "no arguments". Anything that is not a JSON object
/// is rejected with a human-readable reason.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!(
            "arguments must be a JSON object, got {}",
            json_kind(&other)
        )),
        Err(e) => Err(format!("invalid JSON arguments: {}", e)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Short `key=value, ...` rendering of a call's arguments for console traces.
pub(crate) fn tool_args_preview(call: &ToolCallRequest) -> String {
    let Ok(args) = parse_arguments(&call.arguments) else {
        return truncate_preview(&call.arguments, 50);
    };
    let rendered: Vec<String> = args
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect();
    truncate_preview(&rendered.join(", "), 80)
}

fn truncate_preview(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_call(arguments: &str) -> ToolCallRequest {
        ToolCallRequest::new("call_1", "get_forecast", arguments)
    }

    #[test]
    fn test_parse_object() {
        let args = parse_arguments(r#"{"city":"Oslo","days":2}"#).unwrap();
        assert_eq!(args["city"], "Oslo");
        assert_eq!(args["days"], 2);
    }

    #[test]
    fn test_parse_blank_is_empty_object() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert!(parse_arguments("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        let err = parse_arguments("[1,2]").unwrap_err();
        assert!(err.contains("an array"));
        let err = parse_arguments(r#"{"city": "Os"#).unwrap_err();
        assert!(err.starts_with("invalid JSON arguments"));
    }

    #[test]
    fn test_preview_renders_key_values() {
        let preview = tool_args_preview(&make_call(r#"{"city":"Oslo","days":2}"#));
        assert_eq!(preview, "city=Oslo, days=2");
    }

    #[test]
    fn test_preview_of_malformed_payload_is_raw_text() {
        assert_eq!(tool_args_preview(&make_call("{oops")), "{oops");
    }

    #[test]
    fn test_preview_truncates_long_values() {
        let long = "x".repeat(200);
        let preview = tool_args_preview(&make_call(&format!(r#"{{"city":"{}"}}"#, long)));
        assert_eq!(preview.chars().count(), 80);
        assert!(preview.ends_with('…'));
    }
}
