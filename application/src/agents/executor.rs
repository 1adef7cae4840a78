//! Executor agent
//!
//! Runs a bounded ReAct-style loop: ask the LLM for the next action,
//! extract a `TOOL:`/`PARAMS:` call if one is present, invoke the tool,
//! and repeat until the model says "TASK COMPLETE", the step cap, or
//! the tool-call cap. Tool failures are degraded to inline error text
//! in the running narrative; they never stop the loop.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use conductor_domain::{ActionCall, Context, MessageRole, ResultStatus, Task, TaskResult,
    extract_tool_call};

use crate::agents::base::{Agent, AgentError};
use crate::ports::tool::ToolRegistry;

pub const DEFAULT_MAX_STEPS: usize = 10;
pub const DEFAULT_MAX_TOOL_CALLS: usize = 20;

const RECENT_CONTEXT_MESSAGES: usize = 10;
const SUMMARY_RESULT_COUNT: usize = 3;

/// Executes tasks using available tools.
pub struct ExecutorAgent {
    context: Context,
    tools: Arc<ToolRegistry>,
    max_steps: usize,
    max_tool_calls: usize,
    current_step: usize,
    current_tool_calls: usize,
}

impl ExecutorAgent {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            context: Context::new(),
            tools,
            max_steps: DEFAULT_MAX_STEPS,
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
            current_step: 0,
            current_tool_calls: 0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    /// Ask the LLM for the next action given the recent conversation
    /// and the available tool roster.
    async fn next_action(&mut self) -> Result<String, AgentError> {
        let tool_descriptions: Vec<String> = self
            .tools
            .descriptions()
            .into_iter()
            .map(|(name, description)| format!("- {name}: {description}"))
            .collect();

        let instruction = format!(
            "You are an AI assistant tasked with executing a specific task.\n\
             You have access to these tools:\n{}\n\n\
             Decide the next step to take. If you need to use a tool, format your response as:\n\
             TOOL: [tool_name]\n\
             PARAMS: [JSON formatted parameters]\n\n\
             If you've completed the task, clearly state: TASK COMPLETE",
            tool_descriptions.join("\n")
        );

        let mut messages = vec![json!({"role": "system", "content": instruction})];
        for message in self.context.recent_messages(RECENT_CONTEXT_MESSAGES) {
            messages.push(json!({
                "role": message.role.as_str(),
                "content": message.content,
            }));
        }

        let llm = self.tools.get("llm")?;
        let params = std::collections::HashMap::from([(
            "messages".to_string(),
            serde_json::to_string(&messages)?,
        )]);
        Ok(llm.execute(params).await?)
    }

    /// Invoke a tool, converting every failure into inline error text.
    async fn execute_tool(&self, call: &ActionCall) -> String {
        if !self.tools.has_tool(&call.tool) {
            return format!("Error: Tool '{}' not found", call.tool);
        }

        let tool = match self.tools.get(&call.tool) {
            Ok(tool) => tool,
            Err(error) => return format!("Error: {error}"),
        };

        match tool.execute(call.params.clone()).await {
            Ok(result) => result,
            Err(error) => {
                warn!(tool = %call.tool, %error, "tool execution failed");
                format!("Error executing tool: {error}")
            }
        }
    }

    fn generate_summary(&self) -> String {
        let mut instructions: Vec<&str> = Vec::new();
        let mut tool_results: Vec<&str> = Vec::new();

        for message in self.context.all_messages() {
            match message.role {
                MessageRole::User => instructions.push(&message.content),
                MessageRole::System if message.content.contains("Tool result") => {
                    tool_results.push(&message.content);
                }
                _ => {}
            }
        }

        let mut summary = String::from("Execution Summary\n===============\n\n");
        summary.push_str(&format!(
            "Task: {}\n\n",
            instructions.first().copied().unwrap_or("Unknown")
        ));
        summary.push_str(&format!("Steps Taken: {}\n", self.current_step));
        summary.push_str(&format!("Tools Used: {}\n\n", self.current_tool_calls));

        if !tool_results.is_empty() {
            summary.push_str("Key Results:\n");
            let skip = tool_results.len().saturating_sub(SUMMARY_RESULT_COUNT);
            for result in &tool_results[skip..] {
                summary.push_str(&format!("- {result}\n"));
            }
        }

        summary
    }
}

#[async_trait]
impl Agent for ExecutorAgent {
    fn name(&self) -> &str {
        "ExecutorAgent"
    }

    fn description(&self) -> &str {
        "Executes tasks using available tools"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    fn reset(&mut self) {
        self.current_step = 0;
        self.current_tool_calls = 0;
    }

    async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        self.context.add_system_message("Executing task");
        self.context.add_user_message(&task.description);

        self.current_step = 0;
        self.current_tool_calls = 0;

        while self.step().await? {
            if self.current_step >= self.max_steps {
                break;
            }
            self.current_step += 1;
        }

        let status = if self.current_step < self.max_steps {
            ResultStatus::Success
        } else {
            ResultStatus::Incomplete
        };

        let result = TaskResult::new(&task.id, self.generate_summary(), status)
            .with_metadata("steps_executed", self.current_step as u64)
            .with_metadata("tool_calls", self.current_tool_calls as u64)
            .with_agent(self.name());

        Ok(result)
    }

    async fn step(&mut self) -> Result<bool, AgentError> {
        if self.current_tool_calls >= self.max_tool_calls {
            self.context.add_system_message("Reached maximum tool call limit");
            return Ok(false);
        }

        let decision = self.next_action().await?;

        if decision.to_lowercase().contains("task complete") {
            debug!(step = self.current_step, "completion phrase detected");
            return Ok(false);
        }

        if let Some(call) = extract_tool_call(&decision) {
            let result = self.execute_tool(&call).await;
            self.context.add_system_message(format!("Tool result: {result}"));
            self.current_tool_calls += 1;
            return Ok(true);
        }

        // Non-actionable LLM turn; keep going.
        Ok(true)
    }
}
