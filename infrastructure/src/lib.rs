//! Infrastructure layer for conductor
//!
//! Adapters for the application-layer ports: the Docker-backed sandbox,
//! the built-in tools, the OpenAI-compatible LLM gateway, and the
//! configuration loader.

pub mod config;
pub mod llm;
pub mod sandbox;
pub mod tools;

// Re-export commonly used types
pub use config::{
    loader::ConfigLoader,
    settings::{AgentSettings, LlmSettings, Settings},
};
pub use llm::openai::ChatCompletionsGateway;
pub use sandbox::{
    client::SandboxClient,
    vm::{DockerVm, VmBackend, VmConfig},
};
pub use tools::{
    code_execution::CodeExecutionTool,
    llm::LlmTool,
    sandbox_file::{ReadFileTool, WriteFileTool},
};
