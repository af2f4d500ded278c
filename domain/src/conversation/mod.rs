//! Conversation domain.
//!
//! - [`entities::Turn`]: one message in the conversation log, tagged by role
//! - [`entities::Conversation`]: the append-only log replayed to the model
//! - [`response::ModelReply`]: what the model returns for one query

pub mod entities;
pub mod response;

pub use entities::{Conversation, ConversationError, Role, Turn};
pub use response::{FinishReason, ModelReply};
