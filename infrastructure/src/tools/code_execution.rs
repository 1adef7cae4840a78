//! Code execution tool

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use conductor_application::ports::sandbox::SandboxPort;
use conductor_application::ports::tool::{Tool, ToolError};

/// Runs Python code inside the sandbox.
///
/// Parameters: `code` (required), `timeout` (optional, seconds).
pub struct CodeExecutionTool {
    sandbox: Arc<dyn SandboxPort>,
}

impl CodeExecutionTool {
    pub fn new(sandbox: Arc<dyn SandboxPort>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for CodeExecutionTool {
    fn name(&self) -> &str {
        "code_execution"
    }

    fn description(&self) -> &str {
        "Execute Python code in an isolated sandbox. Params: code (required), timeout (optional, seconds)"
    }

    async fn execute(&self, params: HashMap<String, String>) -> Result<String, ToolError> {
        let code = params
            .get("code")
            .ok_or_else(|| ToolError::InvalidParams("missing 'code' parameter".to_string()))?;

        let timeout = match params.get("timeout") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ToolError::InvalidParams(format!("invalid 'timeout' value: {raw}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        debug!(code_len = code.len(), ?timeout, "executing code in sandbox");
        let output = self.sandbox.execute_python(code, timeout).await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_application::ports::sandbox::SandboxError;

    struct FakeSandbox;

    #[async_trait]
    impl SandboxPort for FakeSandbox {
        async fn execute_python(
            &self,
            code: &str,
            _timeout: Option<Duration>,
        ) -> Result<String, SandboxError> {
            Ok(format!("ran {} bytes", code.len()))
        }

        async fn run_command(
            &self,
            _command: &str,
            _timeout: Option<Duration>,
        ) -> Result<String, SandboxError> {
            Ok(String::new())
        }

        async fn read_file(&self, _path: &str) -> Result<String, SandboxError> {
            Ok(String::new())
        }

        async fn write_file(&self, _path: &str, _content: &str) -> Result<(), SandboxError> {
            Ok(())
        }

        async fn cleanup(&self) -> Result<(), SandboxError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_executes_code_param() {
        let tool = CodeExecutionTool::new(Arc::new(FakeSandbox));
        let params = HashMap::from([("code".to_string(), "print(1)".to_string())]);
        assert_eq!(tool.execute(params).await.unwrap(), "ran 8 bytes");
    }

    #[tokio::test]
    async fn test_missing_code_is_invalid_params() {
        let tool = CodeExecutionTool::new(Arc::new(FakeSandbox));
        let result = tool.execute(HashMap::new()).await;
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_bad_timeout_is_invalid_params() {
        let tool = CodeExecutionTool::new(Arc::new(FakeSandbox));
        let params = HashMap::from([
            ("code".to_string(), "print(1)".to_string()),
            ("timeout".to_string(), "soon".to_string()),
        ]);
        assert!(matches!(
            tool.execute(params).await,
            Err(ToolError::InvalidParams(_))
        ));
    }
}
