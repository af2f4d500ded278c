//! OpenAI-compatible chat-completions adapter for the [`LlmGateway`] port.
//!
//! [`LlmGateway`]: skycast_application::LlmGateway

pub mod gateway;
pub mod types;

pub use gateway::{OpenAiGateway, OpenAiSettings};
