//! Presentation-level configuration
//!
//! REPL behavior, resolved from the `[repl]` file section and CLI flags.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    /// Show the spinner and tool-call trace while a turn runs
    pub show_progress: bool,
    /// Path to history file; the data dir default when unset
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// Configured history file, or `<data dir>/skycast/history.txt`.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("skycast").join("history.txt")))
    }
}
