//! Model provider configuration from TOML (`[model]` section)

use crate::openai::OpenAiSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// name = "gpt-4o-mini"
/// base_url = "https://api.openai.com/v1"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_seconds = 60
/// temperature = 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model identifier sent with every request
    pub name: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// API key given directly (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            timeout_seconds: 60,
            temperature: None,
        }
    }
}

impl FileModelConfig {
    /// API key from the environment, falling back to `api_key`.
    pub fn resolve_api_key(&self) -> Option<String> {
        super::resolve_secret(&self.api_key_env, self.api_key.as_deref())
    }

    pub fn to_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            base_url: self.base_url.clone(),
            model: self.name.clone(),
            api_key: self.resolve_api_key(),
            timeout: Duration::from_secs(self.timeout_seconds),
            temperature: self.temperature,
        }
    }
}
