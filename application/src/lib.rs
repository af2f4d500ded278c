//! Application layer for skycast
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{ChatRequest, GatewayError, LlmGateway, ToolChoice},
    progress::{NoProgress, TurnProgressNotifier},
    weather_source::{WeatherError, WeatherSource},
};
pub use use_cases::chat_session::{ChatSession, ChatSessionError, DEFAULT_SYSTEM_PROMPT};
pub use use_cases::invoke_tool::ToolInvoker;
pub use use_cases::run_turn::{
    BUDGET_EXHAUSTED_FALLBACK, EMPTY_RESPONSE_FALLBACK, RunTurnError, RunTurnUseCase,
    TurnOutcome, TurnReply,
};
pub use use_cases::weather_tools::{CURRENT_WEATHER_TOOL, FORECAST_TOOL, WeatherToolset};
