//! Planner agent
//!
//! Turns a task description into an ordered, typed plan via one LLM
//! round trip plus the deterministic plan-text parser. Malformed LLM
//! output degrades to fewer or zero parsed steps, not an error; there
//! is no retry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use conductor_domain::{Context, Plan, Task, TaskResult, parse_plan_steps};

use crate::agents::base::{Agent, AgentError};
use crate::ports::tool::ToolRegistry;

const PLANNING_SYSTEM_PROMPT: &str = "You are a strategic planner for AI agents.";

const PLANNING_TEMPLATE: &str = "\
Task: {task}

Create a step-by-step plan to accomplish this task.
For each step, specify:
1. The goal of the step
2. The agent type best suited for this step (Executor, Validator)
3. Required tools or resources
4. Success criteria for the step

Format the plan as a numbered list with these components clearly labeled.";

pub const DEFAULT_MAX_PLAN_STEPS: usize = 10;

/// Creates execution plans for complex tasks.
pub struct PlannerAgent {
    context: Context,
    tools: Arc<ToolRegistry>,
    max_plan_steps: usize,
}

impl PlannerAgent {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            context: Context::new(),
            tools,
            max_plan_steps: DEFAULT_MAX_PLAN_STEPS,
        }
    }

    pub fn with_max_plan_steps(mut self, max_plan_steps: usize) -> Self {
        self.max_plan_steps = max_plan_steps;
        self
    }

    async fn create_plan(&mut self, task: &Task) -> Result<Plan, AgentError> {
        let prompt = PLANNING_TEMPLATE.replace("{task}", &task.description);

        let llm = self.tools.get("llm")?;
        let params = HashMap::from([
            ("system".to_string(), PLANNING_SYSTEM_PROMPT.to_string()),
            ("prompt".to_string(), prompt),
        ]);
        let response = llm.execute(params).await?;

        let steps = parse_plan_steps(&response, self.max_plan_steps);
        debug!(task_id = %task.id, steps = steps.len(), "parsed plan");

        Ok(Plan::new(
            &task.id,
            format!("Plan for: {}", task.description),
            steps,
        ))
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn name(&self) -> &str {
        "PlannerAgent"
    }

    fn description(&self) -> &str {
        "Creates execution plans for complex tasks"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        self.context.add_system_message("Creating execution plan for task");
        self.context.add_user_message(&task.description);

        let plan = self.create_plan(task).await?;

        let result = TaskResult::success(
            &task.id,
            format!("Plan created with {} steps", plan.steps.len()),
        )
        .with_metadata("plan", serde_json::to_value(&plan)?)
        .with_agent(self.name());

        Ok(result)
    }

    /// Planning happens in a single operation.
    async fn step(&mut self) -> Result<bool, AgentError> {
        Ok(false)
    }
}
