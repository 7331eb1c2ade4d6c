use crate::rules::policy::PolicyVerdict;
use crate::rules::{Issue, Severity};

/// Render issues as console output, ordered by file then position.
pub fn render(issues: &[Issue], verdict: &PolicyVerdict) -> String {
    let mut output = String::new();

    if issues.is_empty() {
        output.push_str("\n  No insecure BrowserWindow configuration detected.\n\n");
        return output;
    }

    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then_with(|| a.finding.position().cmp(&b.finding.position()))
    });

    output.push_str(&format!("\n  {} finding(s) detected:\n\n", issues.len()));

    for issue in &sorted {
        let severity_tag = match issue.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::High => "[HIGH]    ",
            Severity::Medium => "[MEDIUM]  ",
            Severity::Low => "[LOW]     ",
            Severity::Info => "[INFO]    ",
        };
        let review_tag = if issue.finding.manual_review {
            " [REVIEW]"
        } else {
            ""
        };

        output.push_str(&format!(
            "  {}{} {} {}\n",
            severity_tag, review_tag, issue.finding.rule_id, issue.finding.description
        ));
        output.push_str(&format!(
            "           at {}:{}:{}\n",
            issue.file.display(),
            issue.finding.line,
            issue.finding.column
        ));
        if issue.finding.manual_review {
            output.push_str(
                "           note: value is computed at runtime, confirm it is safe\n",
            );
        }
        output.push('\n');
    }

    // Verdict
    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {}, manual review: {})\n\n",
        status,
        verdict.fail_threshold,
        verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
        verdict.manual_review_findings,
    ));

    output
}
