//! Plan-text parser
//!
//! | Rule | Behavior |
//! |------|----------|
//! | Step start | line begins with a digit and has a `.` in its first 5 chars |
//! | Agent line | mentions `agent` or `type`; first of Executor/Validator wins |
//! | Tools line | mentions `tool` or `resource`; split on first `:` then `,` |
//! | Commit | a step is saved when the next step starts or the text ends |
//!
//! The grammar is deliberately small and line-oriented; the planning
//! prompt is tuned to it, so the tie-break rules here must not change.

use crate::plan::entities::PlanStep;

const AGENT_TYPES: [&str; 2] = ["Executor", "Validator"];

/// Parse free-text plan output into structured steps.
///
/// Malformed text degrades to fewer or zero steps, never an error. The
/// output is truncated to `max_steps`, preserving order.
pub fn parse_plan_steps(plan_text: &str, max_steps: usize) -> Vec<PlanStep> {
    let mut steps: Vec<PlanStep> = Vec::new();
    let mut current: Option<PlanStep> = None;

    for line in plan_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_step_start(line) {
            if let Some(step) = current.take()
                && !step.description.is_empty()
            {
                steps.push(step);
            }

            // The step id is the leading digit; the description is
            // whatever follows the first dot.
            let id = &line[..1];
            let description = line
                .split_once('.')
                .map(|(_, rest)| rest.trim())
                .unwrap_or("");
            current = Some(PlanStep::new(id, description, "Executor"));
        } else if let Some(step) = current.as_mut() {
            let lower = line.to_lowercase();
            if lower.contains("agent") || lower.contains("type") {
                for agent_type in AGENT_TYPES {
                    if lower.contains(&agent_type.to_lowercase()) {
                        step.agent_type = agent_type.to_string();
                        break;
                    }
                }
            } else if (lower.contains("tool") || lower.contains("resource"))
                && let Some((_, tools)) = line.split_once(':')
            {
                step.tools.extend(
                    tools
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from),
                );
            }
        }
    }

    if let Some(step) = current
        && !step.description.is_empty()
    {
        steps.push(step);
    }

    steps.truncate(max_steps);
    steps
}

fn is_step_start(line: &str) -> bool {
    let head: String = line.chars().take(5).collect();
    line.chars().next().is_some_and(|c| c.is_ascii_digit()) && head.contains('.')
}
