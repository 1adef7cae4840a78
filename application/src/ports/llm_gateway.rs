//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers. Agents
//! only depend on the reply content being retrievable as text; the wire
//! format belongs to the infrastructure adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Token limit exceeded")]
    TokenLimitExceeded,

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

/// A chat message in provider-neutral form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Reply from an LLM request
#[derive(Debug, Clone)]
pub struct LlmReply {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// Gateway for LLM communication
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a conversation and receive a single completion.
    async fn ask(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
    ) -> Result<LlmReply, GatewayError>;
}
