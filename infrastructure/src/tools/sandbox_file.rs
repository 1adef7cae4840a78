//! Sandbox file tools
//!
//! Thin adapters over the sandbox port so agents can read and write
//! files in the isolated workspace by name.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use conductor_application::ports::sandbox::SandboxPort;
use conductor_application::ports::tool::{Tool, ToolError};

fn require<'a>(
    params: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ToolError::InvalidParams(format!("missing '{key}' parameter")))
}

/// Reads a file from the sandbox. Params: `path` (required).
pub struct ReadFileTool {
    sandbox: Arc<dyn SandboxPort>,
}

impl ReadFileTool {
    pub fn new(sandbox: Arc<dyn SandboxPort>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file from the sandbox workspace. Params: path (required)"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        let path = require(&params, "path")?;
        debug!(%path, "reading file from sandbox");
        let content = self.sandbox.read_file(path).await?;
        Ok(content)
    }
}

/// Writes a file into the sandbox. Params: `path` and `content`
/// (both required).
pub struct WriteFileTool {
    sandbox: Arc<dyn SandboxPort>,
}

impl WriteFileTool {
    pub fn new(sandbox: Arc<dyn SandboxPort>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write a file into the sandbox workspace. Params: path (required), content (required)"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        let path = require(&params, "path")?;
        let content = require(&params, "content")?;
        debug!(%path, bytes = content.len(), "writing file into sandbox");
        self.sandbox.write_file(path, content).await?;
        Ok(format!("Wrote {} bytes to {path}", content.len()))
    }
}
