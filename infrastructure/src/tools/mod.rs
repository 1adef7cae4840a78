//! Built-in tools
//!
//! | Tool | Name | Backs onto |
//! |------|------|------------|
//! | [`code_execution::CodeExecutionTool`] | `code_execution` | the sandbox |
//! | [`sandbox_file::ReadFileTool`] | `read_file` | the sandbox |
//! | [`sandbox_file::WriteFileTool`] | `write_file` | the sandbox |
//! | [`llm::LlmTool`] | `llm` | the LLM gateway |

pub mod code_execution;
pub mod llm;
pub mod sandbox_file;
