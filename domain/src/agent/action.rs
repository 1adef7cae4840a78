//! Tool-call extraction from LLM decision text
//!
//! The executor instructs the model to answer with a two-line grammar:
//!
//! ```text
//! TOOL: <name>
//! PARAMS: {"key": "value", ...}
//! ```
//!
//! Extraction fails open: anything that does not match yields "no tool
//! call" rather than an error, and the executor's loop carries on.

use std::collections::HashMap;

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub tool: String,
    pub params: HashMap<String, String>,
}

/// Extract a tool call from decision text, if one is present.
///
/// The tool name is the text after `TOOL:` on the first line containing
/// that marker. Params come from the first line containing `PARAMS:`:
/// when the text is brace-wrapped it is split naively on commas and
/// colons into a flat string map, quotes stripped. No escaping, no
/// nesting. Missing `TOOL:` or a missing params line yields `None`.
pub fn extract_tool_call(decision_text: &str) -> Option<ActionCall> {
    if !decision_text.contains("TOOL:") {
        return None;
    }

    let tool_line = decision_text.lines().find(|line| line.contains("TOOL:"))?;
    let tool = tool_line.split_once("TOOL:")?.1.trim().to_string();

    let params_line = decision_text.lines().find(|line| line.contains("PARAMS:"))?;
    let params_text = params_line.split_once("PARAMS:")?.1.trim();

    let mut params = HashMap::new();
    if params_text.starts_with('{') && params_text.ends_with('}') {
        let inner = &params_text[1..params_text.len() - 1];
        for part in inner.split(',') {
            if let Some((key, value)) = part.split_once(':') {
                params.insert(strip_quotes(key), strip_quotes(value));
            }
        }
    }

    Some(ActionCall { tool, params })
}

fn strip_quotes(text: &str) -> String {
    text.trim().trim_matches(['"', '\'']).trim().to_string()
}
