//! OpenAI-compatible chat-completions gateway.
//!
//! Works with any endpoint that implements `POST {base_url}/chat/completions`
//! with function calling (OpenAI, Azure-style proxies, Ollama, vLLM, ...).
//! Every query is a single non-streaming request carrying the whole
//! conversation.

use crate::openai::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, WireMessage};
use async_trait::async_trait;
use skycast_application::{ChatRequest, GatewayError, LlmGateway};
use skycast_domain::ModelReply;
use std::time::Duration;
use tracing::{debug, trace};

/// Connection settings for [`OpenAiGateway`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    settings: OpenAiSettings,
}

impl OpenAiGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body<'a>(&'a self, request: &ChatRequest<'a>) -> ChatCompletionRequest<'a> {
        // tool_choice without tools is rejected by most providers.
        let tool_choice = if request.tools.is_empty() {
            None
        } else {
            Some(request.tool_choice.as_str())
        };
        ChatCompletionRequest {
            model: &self.settings.model,
            messages: request.turns.iter().map(WireMessage::from).collect(),
            tools: request.tools,
            tool_choice,
            temperature: self.settings.temperature,
        }
    }
}

fn map_send_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

/// Pull a readable message out of an error body, falling back to the raw
/// text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    fn model_name(&self) -> &str {
        &self.settings.model
    }

    async fn query(&self, request: ChatRequest<'_>) -> Result<ModelReply, GatewayError> {
        let body = self.build_body(&request);
        debug!(
            "Querying {} with {} turns, {} tools (tool_choice: {})",
            self.settings.model,
            body.messages.len(),
            body.tools.len(),
            body.tool_choice.unwrap_or("-")
        );

        let mut http = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.settings.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(map_send_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_send_error)?;
        trace!("Model response ({}): {}", status, text);

        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&text)
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", e, text)))?;
        let model = parsed.model;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))?;

        Ok(choice.into_reply(model))
    }
}
