//! Configuration file loading for skycast
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SKYCAST_*` environment variables (`__` separates section and key)
//! 2. `--config <path>` specified file
//! 3. Project root: `./skycast.toml` or `./.skycast.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/skycast/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_SERVER_COMMAND, FileAgentConfig, FileConfig,
    FileLoggingConfig, FileModelConfig, FileReplConfig, FileToolServerConfig, FileWeatherConfig,
    expand_path,
};
pub use loader::ConfigLoader;
