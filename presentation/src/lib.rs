//! Presentation layer for skycast
//!
//! This crate contains CLI definitions, the console formatter, progress
//! reporters and the interactive chat shell.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplExit, ask};
pub use cli::commands::{Cli, ServerCli};
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
