//! Domain layer for conductor
//!
//! This crate contains the core business logic, entities, and value objects
//! of the multi-agent orchestration framework. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Task / TaskResult**: the unit of work and the uniform result envelope
//!   every agent produces.
//! - **Plan / PlanStep**: an ordered decomposition of a task into sub-work
//!   items, each assigned to an agent type.
//! - **Context**: a bounded per-agent conversation log plus working memory.
//! - **Security**: the static allow/deny policy engine consulted before any
//!   sandbox execution.
//!
//! The deterministic text parsers (plan steps, tool calls, validation
//! verdicts) live here as pure functions: the agent prompts are hand-tuned
//! to these exact grammars, so the parsers are part of the domain contract.

pub mod agent;
pub mod context;
pub mod core;
pub mod plan;
pub mod security;
pub mod task;

// Re-export commonly used types
pub use agent::{
    action::{ActionCall, extract_tool_call},
    verdict::{Verdict, parse_verdict},
};
pub use context::{
    entities::{Context, Message, MessageRole},
    memory::{MemoryItem, WorkingMemory},
};
pub use core::{error::DomainError, string::truncate};
pub use plan::{
    entities::{Plan, PlanStep, StepStatus},
    parser::parse_plan_steps,
};
pub use security::{
    manager::{SecurityCheck, SecurityManager},
    policy::SecurityPolicy,
};
pub use task::{
    entities::Task,
    result::{ResultStatus, TaskResult},
};
