//! Human readable validation summaries.

use std::fmt::Write;

use super::types::{Severity, ValidationIssue};

/// Suggestions of every issue at Info or above, de-duplicated, most severe first
pub(crate) fn recommended_actions(issues: &[ValidationIssue]) -> Vec<String> {
    let mut ordered: Vec<&ValidationIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| b.severity.cmp(&a.severity));

    let mut actions: Vec<String> = Vec::new();
    for issue in ordered {
        if let Some(suggestion) = &issue.suggestion {
            if !actions.contains(suggestion) {
                actions.push(suggestion.clone());
            }
        }
    }
    actions
}

pub(crate) fn render(
    is_valid: bool,
    severity: Severity,
    score: f32,
    issues: &[ValidationIssue],
    actions: &[String],
) -> String {
    let mut out = String::new();
    let status = if is_valid { "VALID" } else { "INVALID" };
    // Writing to a String cannot fail
    let _ = writeln!(
        out,
        "Wave matrix validation: {} (score {:.2}, severity {})",
        status, score, severity
    );

    if issues.is_empty() {
        let _ = writeln!(out, "No issues found.");
        return out;
    }

    let _ = writeln!(out, "Issues ({}):", issues.len());
    for issue in issues {
        let _ = writeln!(
            out,
            "  [{}] {} ({}): {} (current {}, recommended {})",
            issue.severity,
            issue.parameter_name(),
            issue.issue_type,
            issue.description,
            issue.current_value,
            issue.recommended_value
        );
    }

    if !actions.is_empty() {
        let _ = writeln!(out, "Recommended actions:");
        for action in actions {
            let _ = writeln!(out, "  - {}", action);
        }
    }
    out
}
