//! Run Turn use case.
//!
//! Drives one user turn through the tool-calling loop:
//!
//! ```text
//!            ┌────────────────────────────────────────────┐
//!            ▼                                            │
//!   AwaitingModel ──reply with tool calls──▶ DispatchingTools
//!        │
//!        ├──reply without tool calls──▶ Done(Answered | EmptyFallback)
//!        └──iteration budget spent────▶ Done(BudgetExhausted)
//! ```
//!
//! Every model reply is appended to the conversation as an assistant turn,
//! and every tool call yields exactly one tool turn, in request order.
//! Tool calls are dispatched one at a time.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{ChatRequest, GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, TurnProgressNotifier};
use crate::use_cases::invoke_tool::ToolInvoker;
use crate::use_cases::tool_helpers::tool_args_preview;
use skycast_domain::util::truncate_str;
use skycast_domain::{
    Conversation, ConversationError, ModelToolSpec, ToolCallRequest, ToolInvocationOutcome,
    ToolProvider,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Answer given when the model ends the turn without any text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "Sorry, I could not produce a response.";

/// Answer given when the iteration budget runs out.
pub const BUDGET_EXHAUSTED_FALLBACK: &str = "Sorry, processing took too long.";

/// Errors that can occur during a turn.
///
/// Tool failures are not errors: they are recorded in the conversation and
/// the loop continues.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Conversation error: {0}")]
    ConversationError(#[from] ConversationError),
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced a final text answer.
    Answered,
    /// The model stopped calling tools but gave no text.
    EmptyFallback,
    /// The model was still calling tools when the budget ran out.
    BudgetExhausted,
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Answered => "answered",
            TurnOutcome::EmptyFallback => "empty_fallback",
            TurnOutcome::BudgetExhausted => "budget_exhausted",
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Text to show the user: the answer or one of the fallbacks.
    pub text: String,
    pub outcome: TurnOutcome,
    /// Model queries issued.
    pub iterations: usize,
    /// Tool calls dispatched.
    pub tool_calls: usize,
}

impl TurnReply {
    pub fn is_fallback(&self) -> bool {
        self.outcome != TurnOutcome::Answered
    }
}

enum LoopState {
    AwaitingModel,
    DispatchingTools(Vec<ToolCallRequest>),
    Done(TurnOutcome, String),
}

/// Use case for running one user turn through the tool-calling loop.
pub struct RunTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    invoker: ToolInvoker,
    execution: ExecutionParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for RunTurnUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            invoker: self.invoker.clone(),
            execution: self.execution.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl RunTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_provider: Arc<dyn ToolProvider>,
        execution: ExecutionParams,
    ) -> Self {
        let invoker = ToolInvoker::new(tool_provider).with_timeout(execution.tool_timeout);
        Self {
            gateway,
            invoker,
            execution,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn tool_provider(&self) -> &Arc<dyn ToolProvider> {
        self.invoker.provider()
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    pub fn execution(&self) -> &ExecutionParams {
        &self.execution
    }

    /// Append `user_text` to the conversation and run the loop until the
    /// model answers or the iteration budget is spent.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        tools: &[ModelToolSpec],
        user_text: &str,
    ) -> Result<TurnReply, RunTurnError> {
        self.run_turn_with_progress(conversation, tools, user_text, &NoProgress)
            .await
    }

    /// [`run_turn`](Self::run_turn) with progress callbacks.
    pub async fn run_turn_with_progress(
        &self,
        conversation: &mut Conversation,
        tools: &[ModelToolSpec],
        user_text: &str,
        progress: &dyn TurnProgressNotifier,
    ) -> Result<TurnReply, RunTurnError> {
        info!("Starting turn: {}", truncate_str(user_text, 100));

        conversation.append_user(user_text);
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            serde_json::json!({ "text": user_text }),
        ));

        let max_iterations = self.execution.max_iterations;
        let mut iterations = 0;
        let mut tool_calls = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if iterations >= max_iterations => {
                    warn!(
                        "Turn exceeded max_iterations ({}) with tools still requested",
                        max_iterations
                    );
                    LoopState::Done(
                        TurnOutcome::BudgetExhausted,
                        BUDGET_EXHAUSTED_FALLBACK.to_string(),
                    )
                }
                LoopState::AwaitingModel => {
                    iterations += 1;
                    progress.on_model_query(iterations, max_iterations);
                    debug!(
                        "Querying {} ({}/{}), {} turns in history",
                        self.gateway.model_name(),
                        iterations,
                        max_iterations,
                        conversation.len()
                    );

                    let reply = self
                        .gateway
                        .query(ChatRequest::auto(conversation.turns(), tools))
                        .await?;
                    progress.on_model_reply(reply.tool_calls.len());
                    self.conversation_logger.log(ConversationEvent::new(
                        "model_reply",
                        serde_json::json!({
                            "model": reply.model.as_deref().unwrap_or(self.gateway.model_name()),
                            "iteration": iterations,
                            "text": reply.content,
                            "tool_calls": reply.tool_calls.len(),
                        }),
                    ));

                    let answer = reply.text().map(str::to_string);
                    conversation.append_assistant(reply.content, reply.tool_calls.clone());

                    if !reply.tool_calls.is_empty() {
                        LoopState::DispatchingTools(reply.tool_calls)
                    } else if let Some(text) = answer {
                        LoopState::Done(TurnOutcome::Answered, text)
                    } else {
                        warn!("Model returned neither text nor tool calls");
                        LoopState::Done(
                            TurnOutcome::EmptyFallback,
                            EMPTY_RESPONSE_FALLBACK.to_string(),
                        )
                    }
                }
                LoopState::DispatchingTools(calls) => {
                    for call in &calls {
                        tool_calls += 1;
                        let outcome = self.dispatch(call, progress).await;
                        conversation.append_tool(&call.id, outcome.into_turn_text())?;
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Done(outcome, text) => {
                    info!(
                        "Turn finished ({}) after {} model queries and {} tool calls",
                        outcome.as_str(),
                        iterations,
                        tool_calls
                    );
                    self.conversation_logger.log(ConversationEvent::new(
                        "turn_complete",
                        serde_json::json!({
                            "outcome": outcome.as_str(),
                            "iterations": iterations,
                            "tool_calls": tool_calls,
                            "bytes": text.len(),
                            "text": text,
                        }),
                    ));
                    progress.on_turn_complete(outcome);
                    return Ok(TurnReply {
                        text,
                        outcome,
                        iterations,
                        tool_calls,
                    });
                }
            };
        }
    }

    async fn dispatch(
        &self,
        call: &ToolCallRequest,
        progress: &dyn TurnProgressNotifier,
    ) -> ToolInvocationOutcome {
        progress.on_tool_call(&call.name, &tool_args_preview(call));
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "id": call.id,
                "tool": call.name,
                "arguments": call.arguments,
            }),
        ));

        let outcome = self.invoker.invoke_request(call).await;

        progress.on_tool_result(&call.name, &outcome);
        let (status, text) = match &outcome {
            ToolInvocationOutcome::Success(text) => ("success", text.as_str()),
            ToolInvocationOutcome::EmptyResult => ("empty", ""),
            ToolInvocationOutcome::Failure(message) => ("failure", message.as_str()),
        };
        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "id": call.id,
                "tool": call.name,
                "status": status,
                "text": text,
            }),
        ));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};
    use skycast_domain::{
        EMPTY_RESULT, ModelReply, ProviderError, Role, ToolCallResult, ToolDescriptor, Turn,
        adapt,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    /// Replays scripted replies and records every request's turns.
    struct MockGateway {
        replies: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
        tool_counts: Mutex<Vec<usize>>,
    }

    impl MockGateway {
        fn new(replies: Vec<ModelReply>) -> Self {
            Self::with_results(replies.into_iter().map(Ok).collect())
        }

        fn with_results(replies: Vec<Result<ModelReply, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(replies)),
                requests: Mutex::new(Vec::new()),
                tool_counts: Mutex::new(Vec::new()),
            }
        }

        fn query_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        fn model_name(&self) -> &str {
            "mock-model"
        }

        async fn query(&self, request: ChatRequest<'_>) -> Result<ModelReply, GatewayError> {
            assert_eq!(request.tool_choice, crate::ports::llm_gateway::ToolChoice::Auto);
            self.requests.lock().unwrap().push(request.turns.to_vec());
            self.tool_counts.lock().unwrap().push(request.tools.len());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more replies".to_string())))
        }
    }

    enum ToolBehavior {
        Text(&'static str),
        Empty,
        Fail(&'static str),
    }

    /// Provider with per-tool behavior; records calls in order.
    struct MockProvider {
        behaviors: Vec<(&'static str, ToolBehavior)>,
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl MockProvider {
        fn new(behaviors: Vec<(&'static str, ToolBehavior)>) -> Self {
            Self {
                behaviors,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn weather() -> Self {
            Self::new(vec![(
                "get_current_weather",
                ToolBehavior::Text("Paris: 18°C, clear sky"),
            )])
        }

        fn call_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ToolProvider for MockProvider {
        fn id(&self) -> &str {
            "mock"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(self
                .behaviors
                .iter()
                .map(|(name, _)| ToolDescriptor::new(*name, json!({"type": "object"})))
                .collect())
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> Result<ToolCallResult, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            match self.behaviors.iter().find(|(n, _)| *n == name) {
                Some((_, ToolBehavior::Text(text))) => Ok(ToolCallResult::text(*text)),
                Some((_, ToolBehavior::Empty)) => Ok(ToolCallResult::empty()),
                Some((_, ToolBehavior::Fail(message))) => {
                    Err(ProviderError::CallFailed(message.to_string()))
                }
                None => Ok(ToolCallResult::error(format!("Unknown tool: {}", name))),
            }
        }
    }

    /// Counts turn outcomes reported through the progress port.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl TurnProgressNotifier for RecordingProgress {
        fn on_model_query(&self, iteration: usize, max_iterations: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("query {}/{}", iteration, max_iterations));
        }

        fn on_tool_call(&self, tool_name: &str, args_preview: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("call {}({})", tool_name, args_preview));
        }

        fn on_turn_complete(&self, outcome: TurnOutcome) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", outcome.as_str()));
        }
    }

    fn call(id: &str, name: &str, args: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, name, args)
    }

    fn catalog(provider: &MockProvider) -> Vec<ModelToolSpec> {
        let descriptors: Vec<ToolDescriptor> = provider
            .behaviors
            .iter()
            .map(|(name, _)| ToolDescriptor::new(*name, json!({"type": "object"})))
            .collect();
        adapt(&descriptors)
    }

    fn use_case(
        gateway: &Arc<MockGateway>,
        provider: &Arc<MockProvider>,
        max_iterations: usize,
    ) -> RunTurnUseCase {
        RunTurnUseCase::new(
            gateway.clone(),
            provider.clone(),
            ExecutionParams::default().with_max_iterations(max_iterations),
        )
    }

    fn roles(conversation: &Conversation) -> Vec<Role> {
        conversation.turns().iter().map(|t| t.role).collect()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let gateway = Arc::new(MockGateway::new(vec![ModelReply::from_text(
            "Hello! Ask me about the weather.",
        )]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::with_system_prompt("system");

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "hi")
            .await
            .unwrap();

        assert_eq!(reply.text, "Hello! Ask me about the weather.");
        assert_eq!(reply.outcome, TurnOutcome::Answered);
        assert_eq!(reply.iterations, 1);
        assert_eq!(reply.tool_calls, 0);
        assert_eq!(
            roles(&conversation),
            vec![Role::System, Role::User, Role::Assistant]
        );
        assert!(provider.call_names().is_empty());
    }

    #[tokio::test]
    async fn test_single_tool_call_then_answer() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![call(
                "call_1",
                "get_current_weather",
                r#"{"city":"Paris"}"#,
            )]),
            ModelReply::from_text("It is 18°C and clear in Paris."),
        ]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "Weather in Paris?")
            .await
            .unwrap();

        assert_eq!(reply.text, "It is 18°C and clear in Paris.");
        assert_eq!(reply.iterations, 2);
        assert_eq!(reply.tool_calls, 1);
        assert_eq!(
            roles(&conversation),
            vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );

        let tool_turn = &conversation.turns()[2];
        assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_turn.text(), "Paris: 18°C, clear sky");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].1["city"], "Paris");

        // The second query saw the tool result.
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][2].role, Role::Tool);
    }

    #[tokio::test]
    async fn test_multiple_calls_dispatched_in_order() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![
                call("a", "get_current_weather", r#"{"city":"Paris"}"#),
                call("b", "get_forecast", r#"{"city":"Rome","days":2}"#),
            ]),
            ModelReply::from_text("Paris is sunny; Rome will be rainy."),
        ]));
        let provider = Arc::new(MockProvider::new(vec![
            ("get_current_weather", ToolBehavior::Text("Paris: sunny")),
            ("get_forecast", ToolBehavior::Text("Rome: rain")),
        ]));
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "compare")
            .await
            .unwrap();

        assert_eq!(reply.tool_calls, 2);
        assert_eq!(
            provider.call_names(),
            vec!["get_current_weather", "get_forecast"]
        );
        let ids: Vec<_> = conversation
            .turns()
            .iter()
            .filter_map(|t| t.tool_call_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failing_tool_does_not_abort_turn() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![
                call("a", "get_current_weather", r#"{"city":"Atlantis"}"#),
                call("b", "get_forecast", r#"{"city":"Rome"}"#),
            ]),
            ModelReply::from_text("I could not find Atlantis, but Rome looks fine."),
        ]));
        let provider = Arc::new(MockProvider::new(vec![
            ("get_current_weather", ToolBehavior::Fail("city not found")),
            ("get_forecast", ToolBehavior::Text("Rome: fine")),
        ]));
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "q")
            .await
            .unwrap();

        assert_eq!(reply.outcome, TurnOutcome::Answered);
        assert_eq!(
            conversation.turns()[2].text(),
            "Error calling tool: Call failed: city not found"
        );
        assert_eq!(conversation.turns()[3].text(), "Rome: fine");
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_failure_and_loop_continues() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![call("call_1", "get_tides", r#"{"city":"Brest"}"#)]),
            ModelReply::from_text("Sorry, I can't look up tides."),
        ]));
        let provider = Arc::new(MockProvider::weather());
        let tools = catalog(&provider);
        assert!(tools.iter().all(|t| t.name() != "get_tides"));
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &tools, "Tides in Brest?")
            .await
            .unwrap();

        assert_eq!(reply.outcome, TurnOutcome::Answered);
        assert_eq!(reply.text, "Sorry, I can't look up tides.");
        assert_eq!(reply.iterations, 2);
        assert_eq!(provider.call_names(), vec!["get_tides"]);

        let tool_turn = &conversation.turns()[2];
        assert_eq!(tool_turn.role, Role::Tool);
        assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_turn.text(), "Error calling tool: Unknown tool: get_tides");

        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].last(), Some(tool_turn));
    }

    #[tokio::test]
    async fn test_budget_exhausted_never_exceeds_max_queries() {
        let replies = (0..10)
            .map(|i| {
                ModelReply::from_tool_calls(vec![call(
                    &format!("call_{}", i),
                    "get_current_weather",
                    r#"{"city":"Oslo"}"#,
                )])
            })
            .collect();
        let gateway = Arc::new(MockGateway::new(replies));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "loop forever")
            .await
            .unwrap();

        assert_eq!(reply.text, BUDGET_EXHAUSTED_FALLBACK);
        assert_eq!(reply.outcome, TurnOutcome::BudgetExhausted);
        assert_eq!(reply.iterations, 5);
        assert_eq!(gateway.query_count(), 5);
        assert_eq!(conversation.count_role(Role::Assistant), 5);
        assert_eq!(conversation.count_role(Role::Tool), 5);
    }

    #[tokio::test]
    async fn test_empty_content_yields_fallback() {
        let gateway = Arc::new(MockGateway::new(vec![ModelReply {
            content: None,
            ..ModelReply::default()
        }]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "?")
            .await
            .unwrap();

        assert_eq!(reply.text, EMPTY_RESPONSE_FALLBACK);
        assert_eq!(reply.outcome, TurnOutcome::EmptyFallback);
        assert!(reply.is_fallback());
        // The empty assistant turn is still recorded.
        assert_eq!(conversation.count_role(Role::Assistant), 1);
    }

    #[tokio::test]
    async fn test_fallbacks_are_distinguishable() {
        assert_ne!(EMPTY_RESPONSE_FALLBACK, BUDGET_EXHAUSTED_FALLBACK);

        let gateway = Arc::new(MockGateway::new(vec![ModelReply::from_text("")]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();
        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "?")
            .await
            .unwrap();
        assert_eq!(reply.outcome, TurnOutcome::EmptyFallback);
    }

    #[tokio::test]
    async fn test_empty_tool_result_recorded_as_placeholder() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![call("a", "get_forecast", r#"{"city":"Lima"}"#)]),
            ModelReply::from_text("No data for Lima."),
        ]));
        let provider = Arc::new(MockProvider::new(vec![("get_forecast", ToolBehavior::Empty)]));
        let mut conversation = Conversation::new();

        let reply = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "Lima?")
            .await
            .unwrap();

        assert_eq!(reply.outcome, TurnOutcome::Answered);
        assert_eq!(conversation.turns()[2].text(), EMPTY_RESULT);
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_failure_turn() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![call("a", "get_current_weather", "{not json")]),
            ModelReply::from_text("Sorry, let me try again later."),
        ]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();

        use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "?")
            .await
            .unwrap();

        assert!(provider.call_names().is_empty());
        assert!(
            conversation.turns()[2]
                .text()
                .starts_with("Error calling tool: invalid JSON arguments")
        );
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let gateway = Arc::new(MockGateway::with_results(vec![Err(
            GatewayError::ConnectionError("refused".to_string()),
        )]));
        let provider = Arc::new(MockProvider::weather());
        let mut conversation = Conversation::new();

        let result = use_case(&gateway, &provider, 5)
            .run_turn(&mut conversation, &catalog(&provider), "?")
            .await;

        assert!(matches!(
            result,
            Err(RunTurnError::GatewayError(GatewayError::ConnectionError(_)))
        ));
        // The user turn stays in history.
        assert_eq!(roles(&conversation), vec![Role::User]);
    }

    #[tokio::test]
    async fn test_history_persists_across_turns() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_text("First answer"),
            ModelReply::from_text("Second answer"),
        ]));
        let provider = Arc::new(MockProvider::weather());
        let tools = catalog(&provider);
        let run = use_case(&gateway, &provider, 5);
        let mut conversation = Conversation::with_system_prompt("system");

        run.run_turn(&mut conversation, &tools, "one").await.unwrap();
        let second = run.run_turn(&mut conversation, &tools, "two").await.unwrap();

        // Budget is per turn, not per session.
        assert_eq!(second.iterations, 1);
        let requests = gateway.requests.lock().unwrap();
        assert_eq!(requests[1].len(), 4);
        assert_eq!(requests[1][1].text(), "one");
        assert_eq!(requests[1][3].text(), "two");
        assert_eq!(*gateway.tool_counts.lock().unwrap(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_progress_callbacks() {
        let gateway = Arc::new(MockGateway::new(vec![
            ModelReply::from_tool_calls(vec![call(
                "a",
                "get_current_weather",
                r#"{"city":"Oslo"}"#,
            )]),
            ModelReply::from_text("Cold."),
        ]));
        let provider = Arc::new(MockProvider::weather());
        let progress = RecordingProgress::default();
        let mut conversation = Conversation::new();

        use_case(&gateway, &provider, 3)
            .run_turn_with_progress(&mut conversation, &catalog(&provider), "Oslo?", &progress)
            .await
            .unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "query 1/3",
                "call get_current_weather(city=Oslo)",
                "query 2/3",
                "done answered",
            ]
        );
    }
}
