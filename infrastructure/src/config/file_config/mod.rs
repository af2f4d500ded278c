//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section knows how to turn itself into the settings type of the
//! adapter it configures.

mod agent;
mod logging;
mod model;
mod repl;
mod tool_server;
mod weather;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use repl::FileReplConfig;
pub use tool_server::{DEFAULT_SERVER_COMMAND, FileToolServerConfig};
pub use weather::FileWeatherConfig;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("agent.max_iterations must be at least 1")]
    ZeroIterations,

    #[error("{0} cannot be 0")]
    ZeroTimeout(&'static str),

    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("tool_server.command cannot be empty")]
    EmptyServerCommand,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Language model provider
    pub model: FileModelConfig,
    /// Orchestration loop limits
    pub agent: FileAgentConfig,
    /// MCP weather server to spawn
    pub tool_server: FileToolServerConfig,
    /// OpenWeatherMap access (used by the server)
    pub weather: FileWeatherConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.agent.max_iterations == 0 {
            errors.push(ConfigValidationError::ZeroIterations);
        }
        for (field, value) in [
            ("agent.tool_timeout_seconds", self.agent.tool_timeout_seconds),
            ("model.timeout_seconds", self.model.timeout_seconds),
            ("tool_server.startup_timeout_seconds", self.tool_server.startup_timeout_seconds),
            ("weather.timeout_seconds", self.weather.timeout_seconds),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::ZeroTimeout(field));
            }
        }
        if self.model.name.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyModelName);
        }
        if self.tool_server.command.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyServerCommand);
        }

        errors
    }
}

/// Read a secret from `env_var`, falling back to a value given inline.
/// Empty values count as unset.
fn resolve_secret(env_var: &str, inline: Option<&str>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| inline.filter(|v| !v.trim().is_empty()).map(str::to_string))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
