//! Validator verdict parsing
//!
//! Deterministic extraction of a numeric score and feedback bullets from
//! free-text validation output. The 70-point threshold decides pass/fail.

/// Parsed validation verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub score: i64,
    pub passed: bool,
    pub feedback: Vec<String>,
}

/// Passing threshold for the validation score.
pub const PASS_THRESHOLD: i64 = 70;

/// Parse a free-text validation verdict.
///
/// Score: the first line containing both "score" and ":" wins. The text
/// between the first and second colon is read either as an `N/M`
/// fraction, normalized to `round(N/M * 100)`, or as a bare number with
/// an optional `%` suffix. An unparseable or absent score line yields 0.
///
/// Feedback: once a line containing "improvement" or "suggestion" is
/// seen, every later line starting with "-" is collected as one item
/// with the dash stripped.
pub fn parse_verdict(validation_text: &str) -> Verdict {
    let mut score = 0;
    for line in validation_text.lines() {
        let lower = line.to_lowercase();
        if lower.contains("score") && line.contains(':') {
            score = parse_score_text(line.split(':').nth(1).unwrap_or("")).unwrap_or(0);
            break;
        }
    }

    let mut feedback = Vec::new();
    let mut collecting = false;
    for line in validation_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        if lower.contains("improvement") || lower.contains("suggestion") {
            collecting = true;
            continue;
        }
        if collecting && let Some(item) = line.strip_prefix('-') {
            feedback.push(item.trim().to_string());
        }
    }

    Verdict {
        score,
        passed: score >= PASS_THRESHOLD,
        feedback,
    }
}

fn parse_score_text(score_text: &str) -> Option<i64> {
    let score_text = score_text.trim();
    if let Some((num, denom)) = score_text.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let denom: f64 = denom.trim().parse().ok()?;
        if denom == 0.0 {
            return None;
        }
        return Some((num / denom * 100.0).round() as i64);
    }
    let bare: f64 = score_text.replace('%', "").trim().parse().ok()?;
    Some(bare as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_score_passes() {
        let verdict = parse_verdict("Overall assessment is good.\nScore: 85/100\n");
        assert_eq!(verdict.score, 85);
        assert!(verdict.passed);
    }

    #[test]
    fn test_percent_score_fails_threshold() {
        let verdict = parse_verdict("Score: 45%\n");
        assert_eq!(verdict.score, 45);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_no_score_line_yields_zero() {
        let verdict = parse_verdict("The result looks plausible but unverified.");
        assert_eq!(verdict.score, 0);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_first_score_line_wins() {
        let verdict = parse_verdict("Score: 90/100\nScore: 10/100\n");
        assert_eq!(verdict.score, 90);
    }

    #[test]
    fn test_fraction_rounds() {
        let verdict = parse_verdict("Score: 2/3\n");
        assert_eq!(verdict.score, 67);
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(parse_verdict("Score: 70\n").passed);
        assert!(!parse_verdict("Score: 69\n").passed);
    }

    #[test]
    fn test_feedback_collected_after_marker() {
        let text = "Score: 60/100\nSuggestions for improvement:\n- Show the arithmetic\n- Cite the source\nUnrelated trailing line\n";
        let verdict = parse_verdict(text);
        assert_eq!(verdict.feedback, vec!["Show the arithmetic", "Cite the source"]);
    }

    #[test]
    fn test_dashes_before_marker_ignored() {
        let text = "- not feedback\nScore: 80\nSuggestions:\n- real feedback\n";
        let verdict = parse_verdict(text);
        assert_eq!(verdict.feedback, vec!["real feedback"]);
    }

    #[test]
    fn test_garbage_score_text_yields_zero() {
        let verdict = parse_verdict("Score: excellent\n");
        assert_eq!(verdict.score, 0);
    }

    #[test]
    fn test_unparseable_first_line_is_not_reconsidered() {
        let verdict = parse_verdict("Score: excellent\nScore: 50\n");
        assert_eq!(verdict.score, 0);
    }
}
