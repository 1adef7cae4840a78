//! Sandbox port
//!
//! Defines the interface for running untrusted code in an isolated
//! environment. The Docker-backed adapter lives in the infrastructure
//! layer; the code-execution tool consumes this port.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from sandbox operations.
///
/// `Rejected` is a security refusal raised before the environment is
/// touched. `Timeout` kills only the offending process; the environment
/// survives and remains usable.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Container runtime unavailable: {0}")]
    Unavailable(String),

    #[error("Sandbox creation failed: {0}")]
    CreationFailed(String),

    #[error("Sandbox not initialized")]
    NotInitialized,

    #[error("Code rejected by security policy: {0}")]
    Rejected(String),

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    #[error("File transfer failed: {0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for sandboxed execution
#[async_trait]
pub trait SandboxPort: Send + Sync {
    /// Security-gate and execute Python code, returning its output.
    /// Rejected code must never reach the underlying environment.
    async fn execute_python(
        &self,
        code: &str,
        timeout: Option<Duration>,
    ) -> Result<String, SandboxError>;

    /// Run a shell command inside the sandbox working directory.
    async fn run_command(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<String, SandboxError>;

    /// Read a file from inside the sandbox.
    async fn read_file(&self, path: &str) -> Result<String, SandboxError>;

    /// Write a file inside the sandbox.
    async fn write_file(&self, path: &str, content: &str) -> Result<(), SandboxError>;

    /// Tear down the environment. Idempotent; safe to call when nothing
    /// was ever initialized.
    async fn cleanup(&self) -> Result<(), SandboxError>;
}
