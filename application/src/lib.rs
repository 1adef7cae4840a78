//! Application layer for conductor
//!
//! This crate contains the agents and the port definitions they depend
//! on. It depends only on the domain layer; adapters for the ports
//! (sandbox, LLM gateway, built-in tools) live in the infrastructure
//! layer and are injected by the composition root.

pub mod agents;
pub mod ports;

// Re-export commonly used types
pub use agents::{
    base::{Agent, AgentError},
    executor::ExecutorAgent,
    orchestrator::{AgentRegistry, OrchestrationLimits, OrchestratorAgent, TaskState},
    planner::PlannerAgent,
    validator::ValidatorAgent,
};
pub use ports::{
    llm_gateway::{ChatMessage, GatewayError, LlmGateway, LlmReply},
    sandbox::{SandboxError, SandboxPort},
    tool::{Tool, ToolError, ToolRegistry},
};
