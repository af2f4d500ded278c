//! Agent loop configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use skycast_application::ExecutionParams;
use skycast_application::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOOL_TIMEOUT};
use std::time::Duration;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_iterations = 5          # model queries per user turn
/// tool_timeout_seconds = 30   # per tool call
/// system_prompt = "You are a weather assistant."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Maximum model queries per user turn
    pub max_iterations: usize,
    /// Timeout for a single tool call
    pub tool_timeout_seconds: u64,
    /// System prompt; built-in weather assistant prompt when unset
    pub system_prompt: Option<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout_seconds: DEFAULT_TOOL_TIMEOUT.as_secs(),
            system_prompt: None,
        }
    }
}

impl FileAgentConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_iterations(self.max_iterations)
            .with_tool_timeout(Some(Duration::from_secs(self.tool_timeout_seconds)))
    }
}
