//! Orchestrator agent
//!
//! Sequences the multi-agent workflow: planning, execution, validation,
//! summary. Single pass, no retry between phases; plan steps run
//! strictly in list order. Phase failures abort the remaining phases
//! but always surface as a well-formed error result, and no error of
//! any kind propagates past `process`.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use conductor_domain::{
    Context, MemoryItem, Plan, ResultStatus, StepStatus, Task, TaskResult, WorkingMemory, truncate,
};

use crate::agents::base::{Agent, AgentError};
use crate::agents::executor::ExecutorAgent;
use crate::agents::planner::PlannerAgent;
use crate::agents::validator::ValidatorAgent;
use crate::ports::tool::ToolRegistry;

const STEP_EXCERPT_CHARS: usize = 100;

/// Limits applied to the default agent set.
#[derive(Debug, Clone, Copy)]
pub struct OrchestrationLimits {
    pub max_agent_steps: usize,
    pub max_tool_calls: usize,
    pub max_plan_steps: usize,
}

impl Default for OrchestrationLimits {
    fn default() -> Self {
        Self {
            max_agent_steps: crate::agents::executor::DEFAULT_MAX_STEPS,
            max_tool_calls: crate::agents::executor::DEFAULT_MAX_TOOL_CALLS,
            max_plan_steps: crate::agents::planner::DEFAULT_MAX_PLAN_STEPS,
        }
    }
}

/// Registry of agent instances, keyed by agent name.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Box<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its own name, replacing any previous
    /// agent with that name.
    pub fn register(&mut self, agent: Box<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    pub fn remove(&mut self, agent_name: &str) -> Option<Box<dyn Agent>> {
        self.agents.remove(agent_name)
    }

    pub fn get(&self, agent_name: &str) -> Option<&dyn Agent> {
        self.agents.get(agent_name).map(Box::as_ref)
    }

    pub fn get_mut(&mut self, agent_name: &str) -> Option<&mut Box<dyn Agent>> {
        self.agents.get_mut(agent_name)
    }

    /// Look up an agent by type string (e.g. "Executor"), matching
    /// either the registered name or the conventional `<Type>Agent`
    /// name.
    pub fn get_by_type_mut(&mut self, agent_type: &str) -> Option<&mut Box<dyn Agent>> {
        let type_name = format!("{agent_type}Agent");
        self.agents
            .values_mut()
            .find(|agent| agent.name() == agent_type || agent.name() == type_name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Agent>> {
        self.agents.values_mut()
    }
}

/// Stored lifecycle state for a processed task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    InProgress,
    Completed,
    Failed,
}

/// Coordinates the multi-agent system workflow.
pub struct OrchestratorAgent {
    context: Context,
    registry: AgentRegistry,
    task_storage: HashMap<String, TaskState>,
    memory: Option<WorkingMemory>,
}

impl OrchestratorAgent {
    /// Build an orchestrator with the default planner, executor, and
    /// validator registered against the given tool registry.
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self::with_limits(tools, OrchestrationLimits::default())
    }

    pub fn with_limits(tools: Arc<ToolRegistry>, limits: OrchestrationLimits) -> Self {
        let mut registry = AgentRegistry::new();
        registry.register(Box::new(
            PlannerAgent::new(tools.clone()).with_max_plan_steps(limits.max_plan_steps),
        ));
        registry.register(Box::new(
            ExecutorAgent::new(tools.clone())
                .with_max_steps(limits.max_agent_steps)
                .with_max_tool_calls(limits.max_tool_calls),
        ));
        registry.register(Box::new(ValidatorAgent::new(tools)));

        Self {
            context: Context::new(),
            registry,
            task_storage: HashMap::new(),
            memory: None,
        }
    }

    /// Replace or extend the registered agent set.
    pub fn register_agent(&mut self, agent: Box<dyn Agent>) {
        self.registry.register(agent);
    }

    pub fn agent_registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    pub fn task_state(&self, task_id: &str) -> Option<TaskState> {
        self.task_storage.get(task_id).copied()
    }

    /// Working memory, available after `initialize`.
    pub fn memory(&self) -> Option<&WorkingMemory> {
        self.memory.as_ref()
    }

    async fn run_pipeline(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        // 1. Planning
        self.context.add_system_message("Starting planning phase");
        info!(task_id = %task.id, "starting planning phase");
        let plan_result = self.run_planning_phase(task).await?;

        if !plan_result.is_success() {
            return Ok(Self::error_result(
                task,
                "Planning phase failed",
                plan_result.metadata.clone(),
            ));
        }

        // 2. Execution
        self.context.add_system_message("Starting execution phase");
        info!(task_id = %task.id, "starting execution phase");
        let execution_results = self.run_execution_phase(task, &plan_result).await?;

        if execution_results.is_empty() {
            return Ok(Self::error_result(
                task,
                "Execution phase failed",
                HashMap::from([("steps_completed".to_string(), json!(0))]),
            ));
        }

        // 3. Validation
        self.context.add_system_message("Starting validation phase");
        info!(task_id = %task.id, "starting validation phase");
        let validation_result = self.run_validation_phase(task, &execution_results).await?;

        // 4. Summarize
        let final_result =
            self.create_final_result(task, &plan_result, &execution_results, &validation_result)?;

        if let Some(memory) = self.memory.as_mut() {
            memory.add(MemoryItem::new("task_summary", final_result.content.clone()));
        }
        self.task_storage.insert(task.id.clone(), TaskState::Completed);
        Ok(final_result)
    }

    async fn run_planning_phase(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        let Some(planner) = self.registry.get_mut("PlannerAgent") else {
            return Ok(Self::error_result(task, "Planner agent not found", HashMap::new()));
        };
        planner.process(task).await
    }

    async fn run_execution_phase(
        &mut self,
        task: &Task,
        plan_result: &TaskResult,
    ) -> Result<Vec<TaskResult>, AgentError> {
        let Some(plan_value) = plan_result.metadata.get("plan") else {
            return Ok(Vec::new());
        };
        let mut plan = Plan::from_metadata(plan_value)?;

        let mut results = Vec::new();
        for index in 0..plan.steps.len() {
            let (step_id, description, agent_type, step_tools) = {
                let step = &plan.steps[index];
                (
                    step.id.clone(),
                    step.description.clone(),
                    step.agent_type.clone(),
                    step.tools.clone(),
                )
            };

            let step_task =
                Task::with_id(format!("{}_step_{}", task.id, step_id), description)
                    .with_metadata("parent_task_id", task.id.clone())
                    .with_metadata("plan_step_id", step_id.clone())
                    .with_metadata("tools", serde_json::to_value(&step_tools)?);

            // A missing agent skips the step; it is not fatal.
            let Some(agent) = self.registry.get_by_type_mut(&agent_type) else {
                warn!(%agent_type, step = %step_id, "no agent registered for step");
                self.context.add_error(format!("Agent not found for type: {agent_type}"));
                continue;
            };

            let step_result = agent.process(&step_task).await?;
            plan.update_step_status(
                &step_id,
                Self::step_status_for(step_result.status),
                Some(step_result.id.clone()),
            );
            results.push(step_result);
        }

        Ok(results)
    }

    async fn run_validation_phase(
        &mut self,
        task: &Task,
        execution_results: &[TaskResult],
    ) -> Result<TaskResult, AgentError> {
        let combined: Vec<&str> =
            execution_results.iter().map(|r| r.content.as_str()).collect();
        let criteria = task
            .metadata_str("success_criteria")
            .unwrap_or("Task completion");

        let validation_task = Task::with_id(
            format!("{}_validation", task.id),
            format!("Validate results for task: {}", task.description),
        )
        .with_metadata("parent_task_id", task.id.clone())
        .with_metadata("execution_result", combined.join("\n"))
        .with_metadata("success_criteria", criteria);

        // A missing validator degrades to an error result standing in
        // for the validation verdict; summarization still runs.
        let Some(validator) = self.registry.get_mut("ValidatorAgent") else {
            return Ok(Self::error_result(task, "Validator agent not found", HashMap::new()));
        };
        validator.process(&validation_task).await
    }

    fn create_final_result(
        &self,
        task: &Task,
        plan_result: &TaskResult,
        execution_results: &[TaskResult],
        validation_result: &TaskResult,
    ) -> Result<TaskResult, AgentError> {
        let mut summary = String::from("Task Execution Summary\n=====================\n\n");
        summary.push_str(&format!("Task: {}\n\n", task.description));

        if let Some(plan_value) = plan_result.metadata.get("plan")
            && let Ok(plan) = Plan::from_metadata(plan_value)
        {
            summary.push_str(&format!("Plan: {} steps\n\n", plan.steps.len()));
        }

        summary.push_str("Execution:\n");
        for (index, result) in execution_results.iter().enumerate() {
            summary.push_str(&format!(
                "- Step {}: {}\n",
                index + 1,
                result.status.as_str().to_uppercase()
            ));
            summary.push_str(&format!("  {}\n", truncate(&result.content, STEP_EXCERPT_CHARS)));
        }

        let score = validation_result
            .metadata
            .get("score")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let passed = validation_result
            .metadata
            .get("passed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        summary.push_str("\nValidation:\n");
        summary.push_str(&format!("- Score: {score}/100\n"));
        summary.push_str(&format!("- Passed: {}\n", if passed { "True" } else { "False" }));

        if let Some(feedback) = validation_result.metadata.get("feedback").and_then(|v| v.as_array())
            && !feedback.is_empty()
        {
            summary.push_str("- Feedback:\n");
            for point in feedback {
                summary.push_str(&format!("  * {}\n", point.as_str().unwrap_or_default()));
            }
        }

        let status = if passed { ResultStatus::Success } else { ResultStatus::Partial };

        let result = TaskResult::new(&task.id, summary, status)
            .with_metadata(
                "plan",
                plan_result.metadata.get("plan").cloned().unwrap_or(json!({})),
            )
            .with_metadata("execution_results", serde_json::to_value(execution_results)?)
            .with_metadata(
                "validation",
                serde_json::to_value(&validation_result.metadata)?,
            )
            .with_agent("OrchestratorAgent");

        Ok(result)
    }

    fn step_status_for(status: ResultStatus) -> StepStatus {
        match status {
            ResultStatus::Success | ResultStatus::Partial => StepStatus::Completed,
            ResultStatus::Error | ResultStatus::Incomplete => StepStatus::Failed,
        }
    }

    fn error_result(
        task: &Task,
        message: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> TaskResult {
        let mut result = TaskResult::error(&task.id, message).with_agent("OrchestratorAgent");
        result.metadata = metadata;
        result
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    fn name(&self) -> &str {
        "OrchestratorAgent"
    }

    fn description(&self) -> &str {
        "Coordinates the multi-agent system workflow"
    }

    fn context(&self) -> &Context {
        &self.context
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Set up working memory and initialize every registered agent.
    async fn initialize(&mut self) -> Result<(), AgentError> {
        self.memory = Some(WorkingMemory::new());
        for agent in self.registry.iter_mut() {
            agent.initialize().await?;
        }
        Ok(())
    }

    async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
        self.task_storage.insert(task.id.clone(), TaskState::InProgress);

        match self.run_pipeline(task).await {
            Ok(result) => Ok(result),
            Err(err) => {
                error!(task_id = %task.id, %err, "orchestration failed");
                self.context.add_error(format!("Orchestration error: {err}"));
                self.task_storage.insert(task.id.clone(), TaskState::Failed);
                Ok(Self::error_result(
                    task,
                    &format!("Orchestration failed: {err}"),
                    HashMap::new(),
                ))
            }
        }
    }

    /// The orchestrator does not use step-by-step execution.
    async fn step(&mut self) -> Result<bool, AgentError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedLlmTool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// An agent double with a fixed result status and a call counter.
    struct SpyAgent {
        name: String,
        status: ResultStatus,
        calls: Arc<AtomicUsize>,
        context: Context,
    }

    impl SpyAgent {
        fn new(name: &str, status: ResultStatus) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let spy = Self {
                name: name.to_string(),
                status,
                calls: calls.clone(),
                context: Context::new(),
            };
            (spy, calls)
        }
    }

    #[async_trait]
    impl Agent for SpyAgent {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "Spy agent"
        }

        fn context(&self) -> &Context {
            &self.context
        }

        fn context_mut(&mut self) -> &mut Context {
            &mut self.context
        }

        async fn process(&mut self, task: &Task) -> Result<TaskResult, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TaskResult::new(&task.id, "spy result", self.status))
        }

        async fn step(&mut self) -> Result<bool, AgentError> {
            Ok(false)
        }
    }

    fn orchestrator_with_llm(responses: Vec<&str>) -> OrchestratorAgent {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(ScriptedLlmTool::new(responses)))
            .unwrap();
        OrchestratorAgent::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_plan_failure_aborts_before_execution() {
        let mut orchestrator = orchestrator_with_llm(vec![]);

        let (planner, _) = SpyAgent::new("PlannerAgent", ResultStatus::Error);
        let (executor, executor_calls) = SpyAgent::new("ExecutorAgent", ResultStatus::Success);
        let (validator, validator_calls) = SpyAgent::new("ValidatorAgent", ResultStatus::Success);
        orchestrator.register_agent(Box::new(planner));
        orchestrator.register_agent(Box::new(executor));
        orchestrator.register_agent(Box::new(validator));

        let task = Task::new("doomed task");
        let result = orchestrator.process(&task).await.unwrap();

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.content.contains("Planning phase failed"));
        assert_eq!(executor_calls.load(Ordering::SeqCst), 0);
        assert_eq!(validator_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_plan_aborts_with_execution_error() {
        // Planner output with no parseable steps produces an empty
        // plan, so the execution phase yields zero results.
        let mut orchestrator =
            orchestrator_with_llm(vec!["I could not break this down into steps."]);

        let task = Task::new("unplannable");
        let result = orchestrator.process(&task).await.unwrap();

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.content.contains("Execution phase failed"));
    }

    #[tokio::test]
    async fn test_missing_step_agent_skips_step() {
        let mut orchestrator = orchestrator_with_llm(vec![
            // Two steps, the first for an agent type nobody registered.
            "1. Consult the archivist\n   Agent: Validator\n2. Do the work\n   Agent: Executor\n",
            "TASK COMPLETE",
            "Score: 90/100\n",
        ]);
        // Remove the validator so step 1 has no agent to run it.
        orchestrator.agent_registry_mut().remove("ValidatorAgent");

        let task = Task::new("partially staffed");
        let result = orchestrator.process(&task).await.unwrap();

        // Step 1 was skipped, step 2 executed; validation then failed
        // to find an agent and its error result stood in.
        assert_eq!(result.status, ResultStatus::Partial);
        assert!(result.content.contains("- Step 1: SUCCESS"));
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let mut orchestrator = orchestrator_with_llm(vec![
            "1. Compute the sum\n   Agent: Executor\n   Tools: llm\n",
            "TASK COMPLETE",
            "Assessment: correct.\nScore: 90/100\n",
        ]);

        orchestrator.initialize().await.unwrap();
        let task = Task::new("Compute 2+2")
            .with_metadata("success_criteria", "must state the correct numeric answer");
        let result = orchestrator.process(&task).await.unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(
            orchestrator.memory().unwrap().get_by_kind("task_summary").len(),
            1
        );
        assert!(result.content.contains("Validation:"));
        assert!(result.content.contains("Score: 90/100"));
        assert!(result.content.contains("Passed: True"));
        assert_eq!(orchestrator.task_state(&task.id), Some(TaskState::Completed));

        let validation = result.metadata.get("validation").unwrap();
        assert_eq!(validation.get("passed").and_then(|v| v.as_bool()), Some(true));
    }

    #[tokio::test]
    async fn test_failing_validation_yields_partial() {
        let mut orchestrator = orchestrator_with_llm(vec![
            "1. Attempt the task\n   Agent: Executor\n",
            "TASK COMPLETE",
            "Score: 40/100\nSuggestions for improvement:\n- Try harder\n",
        ]);

        let task = Task::new("hard problem");
        let result = orchestrator.process(&task).await.unwrap();

        assert_eq!(result.status, ResultStatus::Partial);
        assert!(result.content.contains("Passed: False"));
        assert!(result.content.contains("* Try harder"));
    }

    #[tokio::test]
    async fn test_llm_outage_never_panics_or_propagates() {
        // Script exhausted on the first call: the planner's tool error
        // is caught at the top level and wrapped.
        let mut orchestrator = orchestrator_with_llm(vec![]);

        let task = Task::new("anything");
        let result = orchestrator.process(&task).await.unwrap();

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.content.contains("Orchestration failed"));
        assert_eq!(orchestrator.task_state(&task.id), Some(TaskState::Failed));
    }

    #[tokio::test]
    async fn test_get_by_type_matches_conventional_name() {
        let mut registry = AgentRegistry::new();
        let (executor, _) = SpyAgent::new("ExecutorAgent", ResultStatus::Success);
        registry.register(Box::new(executor));

        assert!(registry.get_by_type_mut("Executor").is_some());
        assert!(registry.get_by_type_mut("ExecutorAgent").is_some());
        assert!(registry.get_by_type_mut("Validator").is_none());
    }
}
