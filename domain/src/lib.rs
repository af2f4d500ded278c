//! Domain layer for skycast
//!
//! This crate contains the core types and pure logic of the weather
//! assistant. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! An append-only log of [`Turn`]s (system, user, assistant, tool) replayed
//! in full to the model on every query. Tool turns must answer, in order,
//! the requests of the assistant turn right before them.
//!
//! ## Tools
//!
//! A [`ToolProvider`] advertises [`ToolDescriptor`]s and executes calls.
//! [`adapt`] turns descriptors into the [`ModelToolSpec`]s a function-calling
//! model understands. Each call reduces to a [`ToolInvocationOutcome`].
//!
//! ## Weather
//!
//! Current conditions and 3-hourly forecasts, grouped into days and rendered
//! as text for the model.

pub mod conversation;
pub mod tool;
pub mod util;
pub mod weather;

// Re-export commonly used types
pub use conversation::{
    entities::{Conversation, ConversationError, Role, Turn},
    response::{FinishReason, ModelReply},
};
pub use tool::{
    catalog::{FunctionSpec, ModelToolSpec, ToolKind, adapt},
    entities::{ToolCallRequest, ToolDescriptor},
    provider::{ProviderError, ToolProvider},
    value_objects::{
        EMPTY_RESULT, FAILURE_PREFIX, MISSING_DESCRIPTION, ToolCallResult, ToolContent,
        ToolInvocationOutcome,
    },
};
pub use weather::entities::{
    CurrentConditions, DaySummary, Forecast, ForecastSample, Units, UnknownUnits,
};
