//! Interactive chat module
//!
//! Provides the readline-based session shell around a
//! [`ChatSession`](skycast_application::ChatSession).

mod repl;

pub use repl::{ChatRepl, ReplExit, ask, is_exit_command};
