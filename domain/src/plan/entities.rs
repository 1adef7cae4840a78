//! Plan and PlanStep entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::DomainError;

/// Execution status of a single plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        }
    }

    /// Completed and skipped steps both count as done for progress purposes.
    pub fn is_done(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step in an execution plan.
///
/// Mutated in place by whoever executes it; the status transition is the
/// only required mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Step identifier
    pub id: String,
    /// Step description
    pub description: String,
    /// Type of agent to execute this step
    pub agent_type: String,
    /// Tools required for this step
    #[serde(default)]
    pub tools: Vec<String>,
    /// Step status
    #[serde(default)]
    pub status: StepStatus,
    /// ID of the result for this step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
    /// IDs of steps this step depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PlanStep {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            agent_type: agent_type.into(),
            tools: Vec::new(),
            status: StepStatus::Pending,
            result_id: None,
            dependencies: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

/// An execution plan for a task.
///
/// Step ordering is execution priority order. Dependency edges may
/// reorder actual readiness via [`get_next_steps`](Self::get_next_steps),
/// though the orchestrator currently runs steps strictly in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier
    pub id: String,
    /// ID of the task this plan is for
    pub task_id: String,
    /// Plan creation time
    pub created_at: DateTime<Utc>,
    /// Plan description
    pub description: String,
    /// Plan steps, in execution order
    pub steps: Vec<PlanStep>,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Plan {
    pub fn new(
        task_id: impl Into<String>,
        description: impl Into<String>,
        steps: Vec<PlanStep>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            created_at: Utc::now(),
            description: description.into(),
            steps,
            metadata: HashMap::new(),
        }
    }

    /// Deserialize a plan carried in result metadata.
    pub fn from_metadata(value: &serde_json::Value) -> Result<Self, DomainError> {
        serde_json::from_value(value.clone()).map_err(|e| DomainError::InvalidPlan(e.to_string()))
    }

    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|step| step.status.is_done())
    }

    /// Plan progress from 0.0 to 1.0. An empty plan counts as complete.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 1.0;
        }
        let done = self.steps.iter().filter(|step| step.status.is_done()).count();
        done as f64 / self.steps.len() as f64
    }

    pub fn get_step(&self, step_id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    /// Pending steps whose dependencies are all completed or skipped.
    pub fn get_next_steps(&self) -> Vec<&PlanStep> {
        let done: Vec<&str> = self
            .steps
            .iter()
            .filter(|step| step.status.is_done())
            .map(|step| step.id.as_str())
            .collect();

        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Pending)
            .filter(|step| step.dependencies.iter().all(|dep| done.contains(&dep.as_str())))
            .collect()
    }

    /// Update a step's status and optionally link its result.
    /// Returns false if the step does not exist.
    pub fn update_step_status(
        &mut self,
        step_id: &str,
        status: StepStatus,
        result_id: Option<String>,
    ) -> bool {
        let Some(step) = self.steps.iter_mut().find(|step| step.id == step_id) else {
            return false;
        };
        step.status = status;
        if result_id.is_some() {
            step.result_id = result_id;
        }
        true
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}
