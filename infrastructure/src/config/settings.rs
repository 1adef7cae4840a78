//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every field has a default so a missing file, a partial file, and a
//! complete file all deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::sandbox::vm::VmConfig;

/// LLM provider settings from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model name sent on every request
    pub model: String,
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// API key; local providers usually need none
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Agent loop limits from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum reasoning steps per executor run
    pub max_steps: usize,
    /// Maximum tool invocations per executor run
    pub max_tool_calls: usize,
    /// Maximum steps kept from a generated plan
    pub max_plan_steps: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: 10,
            max_tool_calls: 20,
            max_plan_steps: 10,
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub sandbox: VmConfig,
    pub agents: AgentSettings,
}
