//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn runs through
//! the orchestration loop.

use skycast_domain::ToolInvocationOutcome;

use crate::use_cases::run_turn::TurnOutcome;

/// Callback for progress updates during a turn
///
/// Implementations live in the presentation layer (spinner, tool trace on
/// the console). Every method has a no-op default.
pub trait TurnProgressNotifier: Send + Sync {
    /// Called before each model query. `iteration` starts at 1.
    fn on_model_query(&self, _iteration: usize, _max_iterations: usize) {}

    /// Called when the model answered; `tool_calls` is the number requested.
    fn on_model_reply(&self, _tool_calls: usize) {}

    /// Called before a tool is invoked.
    fn on_tool_call(&self, _tool_name: &str, _args_preview: &str) {}

    /// Called after a tool invocation finished, whatever the outcome.
    fn on_tool_result(&self, _tool_name: &str, _outcome: &ToolInvocationOutcome) {}

    /// Called once the turn reached a terminal state.
    fn on_turn_complete(&self, _outcome: TurnOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl TurnProgressNotifier for NoProgress {}
