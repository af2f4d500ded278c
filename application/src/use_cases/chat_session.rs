//! Chat session use case.
//!
//! Owns everything that lives for one session: the conversation, the tool
//! catalog fetched once at start, and the turn runner holding the model and
//! tool provider handles.

use crate::ports::progress::{NoProgress, TurnProgressNotifier};
use crate::use_cases::run_turn::{RunTurnError, RunTurnUseCase, TurnReply};
use skycast_domain::{Conversation, ModelToolSpec, ProviderError, ToolDescriptor, adapt};
use thiserror::Error;
use tracing::info;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that helps users find out \
the weather in any city. You have access to tools for getting the current weather and a \
multi-day forecast. Use them instead of guessing, and answer in the user's language.";

/// Errors that can occur while starting a session
#[derive(Error, Debug)]
pub enum ChatSessionError {
    #[error("Failed to list tools: {0}")]
    ToolDiscovery(#[from] ProviderError),
}

/// One interactive session with the assistant
pub struct ChatSession {
    run_turn: RunTurnUseCase,
    catalog: Vec<ToolDescriptor>,
    tools: Vec<ModelToolSpec>,
    conversation: Conversation,
}

impl ChatSession {
    /// Fetch the tool catalog, adapt it for the model and open the
    /// conversation with the system prompt.
    pub async fn start(
        run_turn: RunTurnUseCase,
        system_prompt: Option<&str>,
    ) -> Result<Self, ChatSessionError> {
        let catalog = run_turn.tool_provider().list_tools().await?;
        info!(
            "Session started with {} tools from '{}'",
            catalog.len(),
            run_turn.tool_provider().id()
        );
        let tools = adapt(&catalog);
        let conversation =
            Conversation::with_system_prompt(system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT));

        Ok(Self {
            run_turn,
            catalog,
            tools,
            conversation,
        })
    }

    /// Run one user turn.
    pub async fn ask(&mut self, user_text: &str) -> Result<TurnReply, RunTurnError> {
        self.ask_with_progress(user_text, &NoProgress).await
    }

    pub async fn ask_with_progress(
        &mut self,
        user_text: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnReply, RunTurnError> {
        self.run_turn
            .run_turn_with_progress(&mut self.conversation, &self.tools, user_text, progress)
            .await
    }

    /// Tools as advertised by the provider.
    pub fn catalog(&self) -> &[ToolDescriptor] {
        &self.catalog
    }

    /// Tools as offered to the model.
    pub fn tools(&self) -> &[ModelToolSpec] {
        &self.tools
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model_name(&self) -> &str {
        self.run_turn.model_name()
    }

    pub fn max_iterations(&self) -> usize {
        self.run_turn.execution().max_iterations
    }
}
