//! Weather API configuration from TOML (`[weather]` section)

use crate::weather::OpenWeatherSettings;
use crate::weather::openweather::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw OpenWeatherMap configuration from TOML
///
/// Read by the weather server (and by the chat client in `--in-process`
/// mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWeatherConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// API key given directly (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Language of condition descriptions, e.g. "en" or "ru"
    pub lang: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for FileWeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            lang: None,
            timeout_seconds: 30,
        }
    }
}

impl FileWeatherConfig {
    pub fn to_settings(&self) -> OpenWeatherSettings {
        OpenWeatherSettings {
            base_url: self.base_url.clone(),
            api_key: super::resolve_secret(&self.api_key_env, self.api_key.as_deref()),
            api_key_env: self.api_key_env.clone(),
            lang: self.lang.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}
