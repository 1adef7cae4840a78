//! Sandbox client facade
//!
//! Composes the security gate with the VM lifecycle: code is validated
//! before the environment is ever touched, the VM is provisioned
//! lazily on first use, and a single lock serializes create, cleanup,
//! and in-flight commands so script writes never interleave.

use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use conductor_application::ports::sandbox::{SandboxError, SandboxPort};
use conductor_domain::{SecurityManager, SecurityPolicy};

use super::vm::{DockerVm, VmBackend, VmConfig, short_id};

/// Single entry point tools use to run code safely.
pub struct SandboxClient<B: VmBackend = DockerVm> {
    vm: Mutex<B>,
    security: SecurityManager,
    default_timeout: Duration,
}

impl SandboxClient<DockerVm> {
    pub fn new(config: VmConfig, policy: SecurityPolicy) -> Self {
        let default_timeout = config.timeout_duration();
        Self {
            vm: Mutex::new(DockerVm::new(config)),
            security: SecurityManager::new(policy),
            default_timeout,
        }
    }
}

impl<B: VmBackend> SandboxClient<B> {
    /// Build a client over an arbitrary backend.
    pub fn with_backend(backend: B, policy: SecurityPolicy, default_timeout: Duration) -> Self {
        Self {
            vm: Mutex::new(backend),
            security: SecurityManager::new(policy),
            default_timeout,
        }
    }

    /// Lazily provision the VM. Callers never observe an uninitialized
    /// state as long as creation itself succeeds.
    async fn ensure_initialized(vm: &mut B) -> Result<(), SandboxError> {
        if !vm.is_created() {
            vm.create().await?;
            info!("sandbox initialized");
        }
        Ok(())
    }

    async fn write_file_locked(vm: &B, path: &str, content: &str) -> Result<(), SandboxError> {
        let mut scratch = tempfile::NamedTempFile::new()?;
        scratch.write_all(content.as_bytes())?;
        scratch.flush()?;
        vm.copy_to_vm(scratch.path(), path).await
    }

    /// Copy a host file into the sandbox.
    pub async fn copy_to(&self, local_path: &Path, vm_path: &str) -> Result<(), SandboxError> {
        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;
        vm.copy_to_vm(local_path, vm_path).await
    }

    /// Copy a sandbox file out to the host.
    pub async fn copy_from(&self, vm_path: &str, local_path: &Path) -> Result<(), SandboxError> {
        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;
        vm.copy_from_vm(vm_path, local_path).await
    }
}

#[async_trait]
impl<B: VmBackend> SandboxPort for SandboxClient<B> {
    async fn execute_python(
        &self,
        code: &str,
        timeout: Option<Duration>,
    ) -> Result<String, SandboxError> {
        // Security gate first: rejected code never reaches the VM.
        let (safe, reason) = self.security.is_code_safe(code);
        if !safe {
            let reason = reason.unwrap_or_else(|| "unspecified".to_string());
            warn!(%reason, "code rejected by security policy");
            return Err(SandboxError::Rejected(reason));
        }

        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;

        let script_path = format!("/tmp/script_{}.py", short_id());
        Self::write_file_locked(&vm, &script_path, code).await?;

        let command = format!("cd /tmp && python3 {script_path}");
        let result = vm
            .exec(&command, Some(timeout.unwrap_or(self.default_timeout)))
            .await;

        // Scratch file removal is best-effort on both outcomes.
        if let Err(err) = vm.exec(&format!("rm -f {script_path}"), None).await {
            warn!(%err, script = %script_path, "failed to remove scratch file");
        }

        result
    }

    async fn run_command(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<String, SandboxError> {
        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;
        vm.exec(command, timeout).await
    }

    async fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;

        let scratch = tempfile::NamedTempFile::new()?;
        vm.copy_from_vm(path, scratch.path()).await?;
        let content = tokio::fs::read_to_string(scratch.path()).await?;
        Ok(content)
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), SandboxError> {
        let mut vm = self.vm.lock().await;
        Self::ensure_initialized(&mut vm).await?;
        Self::write_file_locked(&vm, path, content).await
    }

    async fn cleanup(&self) -> Result<(), SandboxError> {
        let mut vm = self.vm.lock().await;
        let result = vm.cleanup().await;
        info!("sandbox cleaned up");
        result
    }
}
