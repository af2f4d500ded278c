//! Tool server configuration from TOML (`[tool_server]` section)

use crate::mcp::StdioServerParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Name of the bundled weather server binary.
pub const DEFAULT_SERVER_COMMAND: &str = "skycast-weather-server";

/// Raw MCP tool server configuration from TOML
///
/// # Example
///
/// ```toml
/// [tool_server]
/// command = "skycast-weather-server"
/// args = ["-v"]
/// startup_timeout_seconds = 10
///
/// [tool_server.env]
/// OPENWEATHER_API_KEY = "..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolServerConfig {
    /// Executable to spawn
    pub command: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Extra environment variables for the server process
    pub env: HashMap<String, String>,
    /// Time allowed for the handshake and tool listing
    pub startup_timeout_seconds: u64,
}

impl Default for FileToolServerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SERVER_COMMAND.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            startup_timeout_seconds: 10,
        }
    }
}

impl FileToolServerConfig {
    pub fn to_params(&self) -> StdioServerParams {
        StdioServerParams {
            command: self.command.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_seconds)
    }
}
