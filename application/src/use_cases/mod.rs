//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat_session;
pub mod invoke_tool;
pub mod run_turn;
pub mod tool_helpers;
pub mod weather_tools;
