//! Security policy for sandboxed environments

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Static allow/deny rule set consulted before sandbox execution.
/// Loaded once per SecurityManager instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Allowed Python modules
    pub allowed_modules: HashSet<String>,
    /// Blocked Python modules and functions
    pub blocked_modules: HashSet<String>,
    /// Allowed filesystem directories for absolute paths
    pub allowed_directories: HashSet<String>,
    /// Maximum execution time in seconds
    pub max_execution_time: u64,
    /// Memory limit in MB
    pub memory_limit_mb: u64,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        let allowed_modules = [
            // Standard library safe modules
            "math", "random", "time", "datetime", "collections",
            "itertools", "functools", "operator", "string", "re",
            "json", "base64", "hashlib", "uuid", "os.path",
            // Web-related modules
            "urllib.parse", "http.client", "urllib.request",
            // Data processing
            "csv", "io", "tempfile",
        ];

        let blocked_modules = [
            // System access
            "subprocess", "sys", "os.system", "os.popen", "os.execl",
            "os.execle", "os.execlp", "os.execlpe", "os.execv", "os.execve",
            "os.execvp", "os.execvpe", "os.spawn", "os.spawnl", "os.spawnle",
            "os.spawnlp", "os.spawnlpe", "os.spawnv", "os.spawnve", "os.spawnvp",
            // File operations beyond the sandbox
            "os.remove", "os.unlink", "os.rmdir", "os.chmod", "os.chown",
            "shutil.rmtree", "shutil.copy", "shutil.move",
            // Network access unless explicitly allowed
            "socket", "asyncio.subprocess", "telnetlib", "smtplib",
            // Code execution
            "eval", "exec", "compile", "__import__", "builtins.__import__",
        ];

        Self {
            allowed_modules: allowed_modules.iter().map(|m| m.to_string()).collect(),
            blocked_modules: blocked_modules.iter().map(|m| m.to_string()).collect(),
            allowed_directories: ["/tmp", "/workspace"].iter().map(|d| d.to_string()).collect(),
            max_execution_time: 30,
            memory_limit_mb: 256,
        }
    }
}

impl SecurityPolicy {
    /// Whether the policy allows any networking module.
    pub fn network_allowed(&self) -> bool {
        self.allowed_modules
            .iter()
            .any(|m| m.contains("requests") || m.contains("urllib"))
    }
}
