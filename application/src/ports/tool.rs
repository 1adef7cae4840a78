//! Tool port and registry
//!
//! Tools are the pluggable capabilities agents invoke by name: code
//! execution, sandbox file access, the LLM itself. The registry is
//! built once by the composition root and shared as `Arc<ToolRegistry>`;
//! registration is a startup-time concern, never concurrent with task
//! processing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::sandbox::SandboxError;

/// Errors from tool registration and execution
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Tool '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

/// A named capability agents can invoke.
///
/// Parameters arrive as a flat string map, matching the executor's
/// naive `PARAMS:` grammar. Results are plain text appended to the
/// agent's context.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError>;
}

/// Name to tool lookup shared by all agents.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Duplicate names are rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::AlreadyRegistered(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted for stable prompt rendering.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs for every tool, sorted by name.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .tools
            .values()
            .map(|tool| (tool.name().to_string(), tool.description().to_string()))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
