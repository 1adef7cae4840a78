//! Task result envelope
//!
//! Every `process()` call produces exactly one [`TaskResult`]. The
//! [`ResultStatus`] field is the authoritative success signal consumed by
//! orchestration branching: the orchestrator never inspects result content
//! to decide control flow, only status and metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Outcome status of a processed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    /// Task completed successfully
    #[default]
    Success,
    /// Task failed with an error
    Error,
    /// Task partially completed (e.g. validation did not pass)
    Partial,
    /// Task ran out of steps before completing
    Incomplete,
}

impl ResultStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Error => "error",
            ResultStatus::Partial => "partial",
            ResultStatus::Incomplete => "incomplete",
        }
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The standard output envelope for any agent operation.
///
/// Immutable after creation except for [`add_metadata`](Self::add_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Unique result identifier
    pub id: String,
    /// ID of the task that produced this result
    pub task_id: String,
    /// Result creation time
    pub timestamp: DateTime<Utc>,
    /// Result status
    pub status: ResultStatus,
    /// Result content
    pub content: String,
    /// Additional metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Name of the agent that produced this result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, content: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            timestamp: Utc::now(),
            status,
            content: content.into(),
            metadata: HashMap::new(),
            agent_id: None,
        }
    }

    pub fn success(task_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(task_id, content, ResultStatus::Success)
    }

    pub fn error(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(task_id, format!("Error: {}", message.into()), ResultStatus::Error)
    }

    pub fn partial(task_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(task_id, content, ResultStatus::Partial)
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == ResultStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ResultStatus::Success,
            ResultStatus::Error,
            ResultStatus::Partial,
            ResultStatus::Incomplete,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: ResultStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
            assert_eq!(json.trim_matches('"'), status.as_str());
        }
    }

    #[test]
    fn test_success_result() {
        let result = TaskResult::success("task-1", "done").with_agent("ExecutorAgent");
        assert!(result.is_success());
        assert!(!result.is_error());
        assert_eq!(result.agent_id.as_deref(), Some("ExecutorAgent"));
    }

    #[test]
    fn test_error_result_prefixes_content() {
        let result = TaskResult::error("task-1", "planning failed");
        assert!(result.is_error());
        assert_eq!(result.content, "Error: planning failed");
    }

    #[test]
    fn test_add_metadata() {
        let mut result = TaskResult::partial("task-1", "half done");
        result.add_metadata("score", 45);
        assert_eq!(result.metadata.get("score").and_then(|v| v.as_i64()), Some(45));
    }
}
