//! Validator agent
//!
//! Scores an execution result against success criteria via one LLM call
//! plus deterministic verdict parsing. The validator's own result is
//! always "success" when the call goes through; the pass/fail judgment
//! of the validated content lives in `metadata.passed` and
//! `metadata.score`, consumed by the orchestrator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use conductor_domain::{Context, Task, TaskResult, Verdict, parse_verdict};

use crate::agents::base::{Agent, AgentError};
use crate::ports::tool::ToolRegistry;

const VALIDATION_SYSTEM_PROMPT: &str =
    "You are a critical validator that evaluates task execution quality.";

const VALIDATION_TEMPLATE: &str = "\
Task: {task}

Execution Result: {result}

Success Criteria:
{criteria}

Please evaluate the execution result against the success criteria.
For each criterion, provide:
1. Pass/Fail status
2. Justification for your assessment
3. Suggestions for improvement if applicable

Finally, provide an overall assessment and score (0-100).";

/// Validates task execution results against criteria.
pub struct ValidatorAgent {
    context: Context,
    tools: Arc<ToolRegistry>,
}

impl ValidatorAgent {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            context: Context::new(),
            tools,
        }
    }

    async fn validate(
        &self,
        task: &str,
        result: &str,
        criteria: &str,
    ) -> Result<(String, Verdict), AgentError> {
        let prompt = VALIDATION_TEMPLATE
            .replace("{task}", task)
            .replace("{result}", result)
            .replace("{criteria}", criteria);

        let llm = self.tools.get("llm")?;
        let params = HashMap::from([
            ("system".to_string(), VALIDATION_SYSTEM_PROMPT.to_string()),
            ("prompt".to_string(), prompt),
        ]);
        let validation_text = llm.execute(params).await?;

        let verdict = parse_verdict(&validation_text);
        debug!(score = verdict.score, passed = verdict.passed, "parsed verdict");
        Ok((validation_text, verdict))
    }
}

#[async_trait]
impl Agent for ValidatorAgent {
    fn name(&self) -> &str {
        "ValidatorAgent"
    }

    fn description(&self) -> &str {
        "Validates task execution results against criteria"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        let execution_result = task
            .metadata_str("execution_result")
            .unwrap_or("No execution result provided");
        let success_criteria = task
            .metadata_str("success_criteria")
            .unwrap_or("Task completion");

        self.context.add_system_message("Validating task execution results");
        self.context.add_user_message(format!(
            "Task: {}\n\nResult: {execution_result}\n\nValidate against criteria: {success_criteria}",
            task.description
        ));

        let (validation_text, verdict) = self
            .validate(&task.description, execution_result, success_criteria)
            .await?;

        let content = if validation_text.is_empty() {
            "Validation completed".to_string()
        } else {
            validation_text
        };

        let result = TaskResult::success(&task.id, content)
            .with_metadata("score", verdict.score)
            .with_metadata("passed", verdict.passed)
            .with_metadata("feedback", serde_json::to_value(&verdict.feedback)?)
            .with_agent(self.name());

        Ok(result)
    }

    /// Validation happens in a single operation.
    async fn step(&mut self) -> Result<bool, AgentError> {
        Ok(false)
    }
}
