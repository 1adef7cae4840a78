//! OpenAI-compatible chat completions gateway
//!
//! Speaks the `/chat/completions` wire format, which most local and
//! hosted providers accept. A `system` instruction is prepended as the
//! first message when the caller supplies one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use conductor_application::ports::llm_gateway::{
    ChatMessage, GatewayError, LlmGateway, LlmReply,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Gateway over any OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmGateway for ChatCompletionsGateway {
    async fn ask(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
    ) -> Result<LlmReply, GatewayError> {
        let mut wire: Vec<WireMessage<'_>> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = system {
            wire.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        wire.extend(messages.iter().map(|m| WireMessage {
            role: &m.role,
            content: &m.content,
        }));

        let request = ChatRequest {
            model: &self.model,
            messages: wire,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, message_count = messages.len(), "sending chat request");

        let mut builder = self
            .client
            .post(self.endpoint())
            .timeout(REQUEST_TIMEOUT)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                GatewayError::Connection(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat request failed");
            if body.contains("context_length") || body.contains("maximum context length") {
                return Err(GatewayError::TokenLimitExceeded);
            }
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".to_string()))?;

        Ok(LlmReply {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let gateway = ChatCompletionsGateway::new(
            "http://localhost:11434/v1/",
            None,
            "test-model",
            1024,
            0.7,
        );
        assert_eq!(gateway.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "choices": [
                {"message": {"content": "hello"}, "finish_reason": "stop"}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
        assert_eq!(parsed.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_null_content_tolerated() {
        let raw = r#"{"choices": [{"message": {"content": null}, "finish_reason": null}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
