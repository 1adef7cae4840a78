//! Docker-backed sandbox VM
//!
//! Shells out to the `docker` binary rather than speaking the daemon
//! API: the container holds a long-lived idle process, commands are
//! injected with `docker exec`, and files move through `docker cp`.
//! A command timeout kills only the in-flight exec; the container
//! survives and stays usable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use conductor_application::ports::sandbox::SandboxError;

/// Resource envelope for a sandbox instance. Immutable once the VM is
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Container image to run
    pub image: String,
    /// Workspace directory inside the VM
    pub workspace_dir: String,
    /// Memory limit (docker syntax, e.g. "256m")
    pub memory_limit: String,
    /// CPU limit in cores
    pub cpu_limit: f64,
    /// Whether networking is enabled
    pub network_enabled: bool,
    /// Default execution timeout in seconds
    pub timeout: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            image: "python:3.11-slim".to_string(),
            workspace_dir: "/workspace".to_string(),
            memory_limit: "256m".to_string(),
            cpu_limit: 0.5,
            network_enabled: false,
            timeout: 30,
        }
    }
}

impl VmConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Backend contract the sandbox client drives. Split out so tests can
/// substitute a recording backend.
#[async_trait]
pub trait VmBackend: Send + Sync {
    /// Provision the environment. Fatal on failure; cleanup is
    /// attempted before the error propagates.
    async fn create(&mut self) -> Result<(), SandboxError>;

    fn is_created(&self) -> bool;

    /// Execute a shell command inside the workspace directory.
    async fn exec(&self, command: &str, timeout: Option<Duration>)
        -> Result<String, SandboxError>;

    async fn copy_to_vm(&self, local_path: &Path, vm_path: &str) -> Result<(), SandboxError>;

    async fn copy_from_vm(&self, vm_path: &str, local_path: &Path) -> Result<(), SandboxError>;

    /// Idempotent teardown. Secondary failures are logged, never raised.
    async fn cleanup(&mut self) -> Result<(), SandboxError>;
}

/// A Docker container acting as an isolated execution environment.
pub struct DockerVm {
    config: VmConfig,
    container_name: Option<String>,
    scratch_dir: Option<tempfile::TempDir>,
}

impl DockerVm {
    pub fn new(config: VmConfig) -> Self {
        Self {
            config,
            container_name: None,
            scratch_dir: None,
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    fn container_name(&self) -> Result<&str, SandboxError> {
        self.container_name
            .as_deref()
            .ok_or(SandboxError::NotInitialized)
    }

    /// Resolve a path inside the VM: absolute paths pass through,
    /// relative paths land under the workspace directory.
    fn resolve_vm_path(&self, vm_path: &str) -> String {
        if vm_path.starts_with('/') {
            vm_path.to_string()
        } else {
            format!("{}/{vm_path}", self.config.workspace_dir.trim_end_matches('/'))
        }
    }

    async fn docker(args: &[&str]) -> Result<std::process::Output, SandboxError> {
        Command::new("docker")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(SandboxError::Io)
    }

    async fn try_create(&mut self) -> Result<(), SandboxError> {
        which::which("docker").map_err(|e| {
            SandboxError::Unavailable(format!("docker binary not found: {e}"))
        })?;

        let scratch = tempfile::Builder::new()
            .prefix("conductor-vm-")
            .tempdir()?;
        let name = format!("conductor-vm-{}", short_id());

        let network = if self.config.network_enabled { "bridge" } else { "none" };
        let cpus = self.config.cpu_limit.to_string();
        let bind = format!(
            "{}:{}:rw",
            scratch.path().display(),
            self.config.workspace_dir
        );

        let output = Self::docker(&[
            "run",
            "-d",
            "--name",
            &name,
            "--hostname",
            "sandbox",
            "--memory",
            &self.config.memory_limit,
            "--cpus",
            &cpus,
            "--network",
            network,
            "-v",
            &bind,
            "-w",
            &self.config.workspace_dir,
            &self.config.image,
            "tail",
            "-f",
            "/dev/null",
        ])
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SandboxError::CreationFailed(stderr.trim().to_string()));
        }

        info!(container = %name, image = %self.config.image, "created sandbox VM");
        self.container_name = Some(name);
        self.scratch_dir = Some(scratch);
        Ok(())
    }
}

#[async_trait]
impl VmBackend for DockerVm {
    async fn create(&mut self) -> Result<(), SandboxError> {
        match self.try_create().await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Err(cleanup_err) = self.cleanup().await {
                    warn!(%cleanup_err, "cleanup after failed creation also failed");
                }
                error!(%err, "failed to create sandbox VM");
                Err(err)
            }
        }
    }

    fn is_created(&self) -> bool {
        self.container_name.is_some()
    }

    async fn exec(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<String, SandboxError> {
        let name = self.container_name()?;
        let timeout = timeout.unwrap_or_else(|| self.config.timeout_duration());

        let mut cmd = Command::new("docker");
        cmd.args([
            "exec",
            "-w",
            &self.config.workspace_dir,
            "-e",
            "PYTHONUNBUFFERED=1",
            name,
            "sh",
            "-c",
            command,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(result) => result.map_err(SandboxError::Io)?,
            Err(_) => {
                warn!(container = %name, ?timeout, "command timed out");
                return Err(SandboxError::Timeout(timeout));
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            combined.push_str(&stderr);
        }

        // Non-zero exit is a data result, not an error.
        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code != 0 {
            debug!(container = %name, exit_code, "command exited non-zero");
            return Ok(format!("Command exited with code {exit_code}\n{combined}"));
        }

        Ok(combined)
    }

    async fn copy_to_vm(&self, local_path: &Path, vm_path: &str) -> Result<(), SandboxError> {
        let name = self.container_name()?.to_string();

        if !local_path.exists() {
            return Err(SandboxError::Transfer(format!(
                "Local file not found: {}",
                local_path.display()
            )));
        }

        let full_vm_path = self.resolve_vm_path(vm_path);
        if let Some(parent) = Path::new(&full_vm_path).parent() {
            self.exec(&format!("mkdir -p {}", parent.display()), None).await?;
        }

        let local = local_path.display().to_string();
        let target = format!("{name}:{full_vm_path}");
        let output = Self::docker(&["cp", &local, &target]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SandboxError::Transfer(stderr.trim().to_string()));
        }

        debug!(local = %local, vm = %full_vm_path, "copied file into VM");
        Ok(())
    }

    async fn copy_from_vm(&self, vm_path: &str, local_path: &Path) -> Result<(), SandboxError> {
        let name = self.container_name()?.to_string();
        let full_vm_path = self.resolve_vm_path(vm_path);

        if let Some(parent) = local_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let source = format!("{name}:{full_vm_path}");
        let local = local_path.display().to_string();
        let output = Self::docker(&["cp", &source, &local]).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SandboxError::Transfer(stderr.trim().to_string()));
        }

        debug!(vm = %full_vm_path, local = %local, "copied file out of VM");
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), SandboxError> {
        if let Some(name) = self.container_name.take() {
            match Self::docker(&["stop", "-t", "5", &name]).await {
                Ok(output) if !output.status.success() => {
                    warn!(container = %name, "docker stop failed");
                }
                Err(err) => warn!(container = %name, %err, "docker stop failed"),
                _ => {}
            }
            match Self::docker(&["rm", "-f", &name]).await {
                Ok(output) if !output.status.success() => {
                    warn!(container = %name, "docker rm failed");
                }
                Err(err) => warn!(container = %name, %err, "docker rm failed"),
                _ => {}
            }
            info!(container = %name, "removed sandbox VM");
        }

        // TempDir removal happens on drop; surface nothing if it fails.
        self.scratch_dir = None;
        Ok(())
    }
}

pub(crate) fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VmConfig::default();
        assert_eq!(config.image, "python:3.11-slim");
        assert_eq!(config.workspace_dir, "/workspace");
        assert!(!config.network_enabled);
        assert_eq!(config.timeout_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_vm_path() {
        let vm = DockerVm::new(VmConfig::default());
        assert_eq!(vm.resolve_vm_path("/tmp/a.py"), "/tmp/a.py");
        assert_eq!(vm.resolve_vm_path("data/out.txt"), "/workspace/data/out.txt");
    }

    #[tokio::test]
    async fn test_exec_before_create_is_not_initialized() {
        let vm = DockerVm::new(VmConfig::default());
        let result = vm.exec("true", None).await;
        assert!(matches!(result, Err(SandboxError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent_when_never_created() {
        let mut vm = DockerVm::new(VmConfig::default());
        assert!(vm.cleanup().await.is_ok());
        assert!(vm.cleanup().await.is_ok());
    }

    #[test]
    fn test_short_id_length() {
        assert_eq!(short_id().len(), 8);
    }
}
