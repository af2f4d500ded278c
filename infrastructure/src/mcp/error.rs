//! Error types for the MCP adapter

use skycast_domain::ProviderError;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when talking to an MCP server (or serving one)
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn MCP server: {0}")]
    SpawnError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    ParseError { error: String, raw: String },

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl From<McpError> for ProviderError {
    fn from(error: McpError) -> Self {
        match error {
            McpError::TransportClosed | McpError::Io(_) | McpError::SpawnError(_) => {
                ProviderError::NotAvailable(error.to_string())
            }
            McpError::RpcError { .. } => ProviderError::CallFailed(error.to_string()),
            McpError::Timeout(what) => ProviderError::Timeout(what),
            McpError::SerializationError(_)
            | McpError::ParseError { .. }
            | McpError::UnexpectedResponse(_) => {
                ProviderError::MalformedResponse(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        assert!(matches!(
            ProviderError::from(McpError::TransportClosed),
            ProviderError::NotAvailable(_)
        ));
        assert!(matches!(
            ProviderError::from(McpError::RpcError {
                code: -32602,
                message: "bad params".to_string()
            }),
            ProviderError::CallFailed(_)
        ));
        assert!(matches!(
            ProviderError::from(McpError::Timeout("initialize".to_string())),
            ProviderError::Timeout(_)
        ));
    }
}
