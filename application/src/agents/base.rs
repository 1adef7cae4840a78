//! Agent contract
//!
//! Every agent implements `process(task) -> TaskResult` and the
//! step-wise `step() -> bool` hook. The provided `run()` wraps
//! `process` in a scoped execution pattern: reset counters first,
//! record any error into the agent's context, and always run
//! `cleanup()` regardless of outcome.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use conductor_domain::{Context, Task, TaskResult};

use crate::ports::llm_gateway::GatewayError;
use crate::ports::tool::ToolError;

/// Errors agents can raise past their own boundary.
///
/// Tool failures inside the executor's loop are degraded to inline
/// text, not raised; these variants cover the failures that cannot be
/// represented as data (the LLM tool itself missing or unreachable,
/// metadata that does not deserialize).
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] conductor_domain::DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

/// A polymorphic unit of work processing.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name identifying the agent
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn context(&self) -> &Context;

    fn context_mut(&mut self) -> &mut Context;

    /// Process a task and return a result. The only abstract entry
    /// point callers use directly.
    async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError>;

    /// Execute a single step. Returns true if processing should
    /// continue. Internal to agents that loop; single-shot agents
    /// return false.
    async fn step(&mut self) -> Result<bool, AgentError>;

    /// Optional async setup hook. No-op by default; agents declare a
    /// setup step by overriding this rather than being probed for one.
    async fn initialize(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Release resources held by the agent. No-op by default.
    async fn cleanup(&mut self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Reset per-run execution state (step counters). No-op by default.
    fn reset(&mut self) {}

    /// Run the agent on a task inside the execution scope.
    async fn run(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        self.reset();
        let result = self.process(task).await;
        if let Err(error) = &result {
            self.context_mut().add_error(format!("Execution error: {error}"));
        }
        if let Err(error) = self.cleanup().await {
            warn!(agent = self.name(), %error, "agent cleanup failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingAgent {
        context: Context,
        cleaned_up: bool,
    }

    #[async_trait]
    impl Agent for FailingAgent {
        fn name(&self) -> &str {
            "FailingAgent"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn context(&self) -> &Context {
            &self.context
        }

        fn context_mut(&mut self) -> &mut Context {
            &mut self.context
        }

        async fn process(&mut self, _task: &Task) -> Result<TaskResult, AgentError> {
            Err(AgentError::Internal("boom".to_string()))
        }

        async fn step(&mut self) -> Result<bool, AgentError> {
            Ok(false)
        }

        async fn cleanup(&mut self) -> Result<(), AgentError> {
            self.cleaned_up = true;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_records_error_and_cleans_up() {
        let mut agent = FailingAgent {
            context: Context::new(),
            cleaned_up: false,
        };
        let task = Task::new("doomed");

        let result = agent.run(&task).await;
        assert!(result.is_err());
        assert!(agent.cleaned_up);

        let last = agent.context().recent_messages(1);
        assert!(last[0].content.contains("Execution error"));
        assert!(last[0].content.contains("boom"));
    }
}
