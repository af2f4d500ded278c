//! Execution parameters: orchestration loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound one turn of
//! [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on model queries per user turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Default timeout for a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestration loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum number of model queries in one turn.
    pub max_iterations: usize,
    /// Upper bound on a single tool invocation; `None` waits forever.
    pub tool_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: Some(DEFAULT_TOOL_TIMEOUT),
        }
    }
}

impl ExecutionParams {
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_iterations, 5);
        assert_eq!(params.tool_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_max_iterations(2)
            .with_tool_timeout(None);

        assert_eq!(params.max_iterations, 2);
        assert!(params.tool_timeout.is_none());
    }
}
