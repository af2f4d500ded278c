//! Tool domain
//!
//! Descriptors advertised by a provider, the catalog adapter that turns them
//! into model function specs, call requests emitted by the model, and the
//! normalized outcome of running one.

pub mod catalog;
pub mod entities;
pub mod provider;
pub mod value_objects;

pub use catalog::{FunctionSpec, ModelToolSpec, ToolKind, adapt};
pub use entities::{ToolCallRequest, ToolDescriptor};
pub use provider::{ProviderError, ToolProvider};
pub use value_objects::{
    EMPTY_RESULT, FAILURE_PREFIX, MISSING_DESCRIPTION, ToolCallResult, ToolContent,
    ToolInvocationOutcome,
};
