//! Application-level configuration.
//!
//! - [`ExecutionParams`]: orchestration loop control (iterations, tool timeout)

pub mod execution_params;

pub use execution_params::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOOL_TIMEOUT, ExecutionParams};
