//! Shared test doubles for agent tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::tool::{Tool, ToolError};

/// An "llm" tool that replays scripted responses in order and records
/// every call's parameters.
pub struct ScriptedLlmTool {
    responses: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<HashMap<String, String>>>,
}

impl ScriptedLlmTool {
    pub fn new(responses: Vec<&str>) -> Self {
        let mut responses: Vec<String> = responses.into_iter().map(String::from).collect();
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Tool for ScriptedLlmTool {
    fn name(&self) -> &str {
        "llm"
    }

    fn description(&self) -> &str {
        "Scripted language model"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(params);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ToolError::ExecutionFailed("script exhausted".to_string()))
    }
}

/// A generic named tool that records calls and returns a fixed reply.
pub struct RecordingTool {
    name: String,
    reply: String,
    pub calls: Mutex<Vec<HashMap<String, String>>>,
}

impl RecordingTool {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records calls and returns a fixed reply"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        self.calls.lock().unwrap().push(params);
        Ok(self.reply.clone())
    }
}

/// A tool whose execution always fails.
pub struct FailingTool {
    name: String,
}

impl FailingTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    async fn execute(&self, _params: HashMap<String, String>) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed("synthetic failure".to_string()))
    }
}
