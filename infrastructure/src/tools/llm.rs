//! LLM tool
//!
//! Exposes the gateway through the tool interface so agents reach the
//! model the same way they reach every other capability. Two parameter
//! shapes are accepted: a single `prompt` with an optional `system`
//! instruction, or a `messages` parameter holding a JSON conversation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use conductor_application::ports::llm_gateway::{ChatMessage, LlmGateway};
use conductor_application::ports::tool::{Tool, ToolError};

pub struct LlmTool {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmTool {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Tool for LlmTool {
    fn name(&self) -> &str {
        "llm"
    }

    fn description(&self) -> &str {
        "Query the language model. Params: prompt (with optional system), or messages (JSON array of {role, content})"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        let system = params.get("system").map(String::as_str);

        let messages: Vec<ChatMessage> = if let Some(raw) = params.get("messages") {
            serde_json::from_str(raw).map_err(|e| {
                ToolError::InvalidParams(format!("'messages' is not a valid conversation: {e}"))
            })?
        } else if let Some(prompt) = params.get("prompt") {
            vec![ChatMessage::user(prompt)]
        } else {
            return Err(ToolError::InvalidParams(
                "expected 'prompt' or 'messages' parameter".to_string(),
            ));
        };

        debug!(message_count = messages.len(), "querying LLM");
        let reply = self
            .gateway
            .ask(&messages, system)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        Ok(reply.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_application::ports::llm_gateway::{GatewayError, LlmReply};
    use std::sync::Mutex;

    struct EchoGateway {
        seen: Mutex<Vec<(Vec<ChatMessage>, Option<String>)>>,
    }

    impl EchoGateway {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn ask(
            &self,
            messages: &[ChatMessage],
            system: Option<&str>,
        ) -> Result<LlmReply, GatewayError> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), system.map(str::to_string)));
            Ok(LlmReply {
                content: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_prompt_with_system() {
        let gateway = Arc::new(EchoGateway::new());
        let tool = LlmTool::new(gateway.clone());

        let params = HashMap::from([
            ("prompt".to_string(), "hello".to_string()),
            ("system".to_string(), "be brief".to_string()),
        ]);
        assert_eq!(tool.execute(params).await.unwrap(), "hello");

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen[0].0.len(), 1);
        assert_eq!(seen[0].1.as_deref(), Some("be brief"));
    }

    #[tokio::test]
    async fn test_messages_conversation() {
        let tool = LlmTool::new(Arc::new(EchoGateway::new()));
        let conversation =
            r#"[{"role": "user", "content": "first"}, {"role": "assistant", "content": "second"}]"#;
        let params = HashMap::from([("messages".to_string(), conversation.to_string())]);
        assert_eq!(tool.execute(params).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_malformed_messages_rejected() {
        let tool = LlmTool::new(Arc::new(EchoGateway::new()));
        let params = HashMap::from([("messages".to_string(), "not json".to_string())]);
        assert!(matches!(
            tool.execute(params).await,
            Err(ToolError::InvalidParams(_))
        ));
    }

    #[tokio::test]
    async fn test_no_prompt_or_messages_rejected() {
        let tool = LlmTool::new(Arc::new(EchoGateway::new()));
        assert!(matches!(
            tool.execute(HashMap::new()).await,
            Err(ToolError::InvalidParams(_))
        ));
    }
}
