//! Tool invoker.
//!
//! Runs one tool call against the [`ToolProvider`] and normalizes whatever
//! happens into a [`ToolInvocationOutcome`]. Nothing escapes as an error:
//! transport failures, protocol errors, timeouts and malformed arguments all
//! become `Failure`, so one bad call never aborts the rest of a turn.

use serde_json::{Map, Value};
use skycast_domain::{ToolCallRequest, ToolInvocationOutcome, ToolProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::tool_helpers::parse_arguments;

/// Executes tool calls with per-call failure isolation
#[derive(Clone)]
pub struct ToolInvoker {
    provider: Arc<dyn ToolProvider>,
    timeout: Option<Duration>,
}

impl ToolInvoker {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &Arc<dyn ToolProvider> {
        &self.provider
    }

    /// Invoke `name` with already-parsed arguments.
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> ToolInvocationOutcome {
        debug!("Invoking tool '{}' on provider '{}'", name, self.provider.id());

        let call = self.provider.call_tool(name, arguments);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Tool '{}' timed out after {:?}", name, limit);
                    return ToolInvocationOutcome::failure(format!(
                        "'{}' timed out after {}s",
                        name,
                        limit.as_secs()
                    ));
                }
            },
            None => call.await,
        };

        match result {
            Ok(result) => {
                let outcome = ToolInvocationOutcome::from(result);
                if let ToolInvocationOutcome::Failure(message) = &outcome {
                    debug!("Tool '{}' reported an error: {}", name, message);
                }
                outcome
            }
            Err(e) => {
                warn!("Tool '{}' failed: {}", name, e);
                ToolInvocationOutcome::failure(e.to_string())
            }
        }
    }

    /// Parse the model's raw argument payload, then invoke.
    pub async fn invoke_request(&self, request: &ToolCallRequest) -> ToolInvocationOutcome {
        match parse_arguments(&request.arguments) {
            Ok(arguments) => self.invoke(&request.name, arguments).await,
            Err(reason) => {
                warn!(
                    "Rejecting call '{}' ({}): {}",
                    request.name, request.id, reason
                );
                ToolInvocationOutcome::failure(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use skycast_domain::{ProviderError, ToolCallResult, ToolContent, ToolDescriptor};
    use std::sync::Mutex;

    /// Provider whose answer is fixed per test; records the arguments it saw.
    struct ScriptedProvider {
        answer: Box<dyn Fn() -> Result<ToolCallResult, ProviderError> + Send + Sync>,
        delay: Option<Duration>,
        seen: Mutex<Vec<Map<String, Value>>>,
    }

    impl ScriptedProvider {
        fn new(
            answer: impl Fn() -> Result<ToolCallResult, ProviderError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                answer: Box::new(answer),
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl ToolProvider for ScriptedProvider {
        fn id(&self) -> &str {
            "scripted"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(vec![])
        }

        async fn call_tool(
            &self,
            _name: &str,
            arguments: Map<String, Value>,
        ) -> Result<ToolCallResult, ProviderError> {
            self.seen.lock().unwrap().push(arguments);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.answer)()
        }
    }

    fn setup(provider: ScriptedProvider) -> (ToolInvoker, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        (ToolInvoker::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_text_result_is_success() {
        let (invoker, _) = setup(ScriptedProvider::new(|| Ok(ToolCallResult::text("sunny"))));
        let outcome = invoker.invoke("get_current_weather", Map::new()).await;
        assert_eq!(outcome, ToolInvocationOutcome::Success("sunny".to_string()));
    }

    #[tokio::test]
    async fn test_empty_content_is_empty_result() {
        let (invoker, _) = setup(ScriptedProvider::new(|| Ok(ToolCallResult::empty())));
        let outcome = invoker.invoke("get_current_weather", Map::new()).await;
        assert_eq!(outcome, ToolInvocationOutcome::EmptyResult);
    }

    #[tokio::test]
    async fn test_provider_error_is_failure() {
        let (invoker, _) = setup(ScriptedProvider::new(|| {
            Err(ProviderError::NotAvailable("server exited".to_string()))
        }));
        let outcome = invoker.invoke("get_current_weather", Map::new()).await;
        assert_eq!(
            outcome,
            ToolInvocationOutcome::Failure("Provider not available: server exited".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_text_content_is_failure() {
        let (invoker, _) = setup(ScriptedProvider::new(|| {
            Ok(ToolCallResult {
                content: vec![ToolContent::NonText {
                    kind: "image".to_string(),
                }],
                is_error: false,
            })
        }));
        assert!(invoker.invoke("chart", Map::new()).await.is_failure());
    }

    #[tokio::test]
    async fn test_invoke_request_parses_arguments() {
        let (invoker, provider) =
            setup(ScriptedProvider::new(|| Ok(ToolCallResult::text("ok"))));
        let request = ToolCallRequest::new("c1", "get_forecast", r#"{"city":"Rome","days":2}"#);

        invoker.invoke_request(&request).await;

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(Value::Object(seen[0].clone()), json!({"city": "Rome", "days": 2}));
    }

    #[tokio::test]
    async fn test_malformed_arguments_never_reach_provider() {
        let (invoker, provider) =
            setup(ScriptedProvider::new(|| Ok(ToolCallResult::text("ok"))));
        let request = ToolCallRequest::new("c1", "get_forecast", "{city: Rome");

        let outcome = invoker.invoke_request(&request).await;

        assert!(outcome.is_failure());
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let (invoker, _) = setup(
            ScriptedProvider::new(|| Ok(ToolCallResult::text("late")))
                .slow(Duration::from_secs(60)),
        );
        let invoker = invoker.with_timeout(Some(Duration::from_secs(30)));

        let outcome = invoker.invoke("get_forecast", Map::new()).await;
        assert_eq!(
            outcome,
            ToolInvocationOutcome::Failure("'get_forecast' timed out after 30s".to_string())
        );
    }
}
