//! Task entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A task to be processed by the system.
///
/// Identity (`id`) is immutable once created. The `metadata` map is the
/// only field mutated after creation: the orchestrator uses it to carry
/// inter-phase data such as `execution_result` and `success_criteria`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: String,
    /// Human-readable task description
    pub description: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Task priority (higher = more important)
    #[serde(default)]
    pub priority: i32,
    /// Optional deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Task tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Additional metadata, mutated by the orchestrator between phases
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Parent task ID if this is a subtask
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            created_at: Utc::now(),
            priority: 0,
            deadline: None,
            tags: Vec::new(),
            metadata: HashMap::new(),
            parent_id: None,
        }
    }

    /// Create a task with an explicit identifier (subtask ids are derived
    /// from their parent's id, so they are constructed rather than random).
    pub fn with_id(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new(description)
        }
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get a string metadata value
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            return true;
        }
        false
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_overdue(&self) -> bool {
        match self.deadline {
            Some(deadline) => Utc::now() > deadline,
            None => false,
        }
    }

    /// Task age in seconds
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }

    /// Create a subtask of a parent task, inheriting the parent's tags.
    pub fn subtask(parent: &Task, id: impl Into<String>, description: impl Into<String>) -> Self {
        let mut task = Self::with_id(id, description);
        task.tags = parent.tags.clone();
        task.parent_id = Some(parent.id.clone());
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("Compute 2+2").with_priority(5);
        assert!(!task.id.is_empty());
        assert_eq!(task.description, "Compute 2+2");
        assert_eq!(task.priority, 5);
        assert!(task.parent_id.is_none());
    }

    #[test]
    fn test_task_tags() {
        let mut task = Task::new("tagged");
        task.add_tag("math");
        task.add_tag("math"); // duplicate ignored
        assert_eq!(task.tags.len(), 1);
        assert!(task.has_tag("math"));
        assert!(task.remove_tag("math"));
        assert!(!task.remove_tag("math"));
    }

    #[test]
    fn test_task_metadata() {
        let mut task = Task::new("meta");
        task.add_metadata("success_criteria", "must be correct");
        assert_eq!(task.metadata_str("success_criteria"), Some("must be correct"));
        assert_eq!(task.metadata_str("missing"), None);
    }

    #[test]
    fn test_subtask_inherits_tags_and_parent() {
        let mut parent = Task::new("parent");
        parent.add_tag("inherited");

        let sub = Task::subtask(&parent, format!("{}_step_1", parent.id), "child work");
        assert_eq!(sub.parent_id.as_deref(), Some(parent.id.as_str()));
        assert!(sub.has_tag("inherited"));
        assert!(sub.id.ends_with("_step_1"));
    }

    #[test]
    fn test_overdue_without_deadline() {
        assert!(!Task::new("no deadline").is_overdue());
    }
}
