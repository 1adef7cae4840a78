//! Agents
//!
//! | Agent | Role |
//! |-------|------|
//! | [`planner::PlannerAgent`] | one LLM round trip into an ordered plan |
//! | [`executor::ExecutorAgent`] | bounded ReAct-style tool loop |
//! | [`validator::ValidatorAgent`] | scores execution output against criteria |
//! | [`orchestrator::OrchestratorAgent`] | sequences plan, execute, validate, summarize |

pub mod base;
pub mod executor;
pub mod orchestrator;
pub mod planner;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;
