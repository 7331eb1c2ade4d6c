use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Issue, Severity};

/// Policy verdict: the final pass/fail decision after applying
/// ignore list and severity overrides to raw issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub pass: bool,
    pub total_findings: usize,
    pub effective_findings: usize,
    pub manual_review_findings: usize,
    pub highest_severity: Option<Severity>,
    pub fail_threshold: Severity,
}

/// Policy configuration loaded from `.windowguard.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Minimum severity to fail the scan.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
    /// Whether findings that need manual review can fail the scan.
    #[serde(default = "default_manual_review_fails")]
    pub manual_review_fails: bool,
    /// Rule IDs to ignore entirely.
    #[serde(default)]
    pub ignore_rules: HashSet<String>,
    /// Per-rule severity overrides.
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

fn default_fail_on() -> Severity {
    Severity::High
}

fn default_manual_review_fails() -> bool {
    true
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on: Severity::High,
            manual_review_fails: true,
            ignore_rules: HashSet::new(),
            overrides: HashMap::new(),
        }
    }
}

impl Policy {
    /// Evaluate issues against this policy and produce a verdict.
    pub fn evaluate(&self, issues: &[Issue]) -> PolicyVerdict {
        let effective = self.apply(issues);

        let highest = effective.iter().map(|i| i.severity).max();
        let failed = effective
            .iter()
            .filter(|i| self.manual_review_fails || !i.finding.manual_review)
            .any(|i| i.severity >= self.fail_on);

        PolicyVerdict {
            pass: !failed,
            total_findings: issues.len(),
            effective_findings: effective.len(),
            manual_review_findings: effective
                .iter()
                .filter(|i| i.finding.manual_review)
                .count(),
            highest_severity: highest,
            fail_threshold: self.fail_on,
        }
    }

    /// Filter issues: remove ignored rules, apply overrides.
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        issues
            .iter()
            .filter(|i| !self.ignore_rules.contains(&i.finding.rule_id))
            .map(|i| {
                let mut i = i.clone();
                if let Some(&override_sev) = self.overrides.get(&i.finding.rule_id) {
                    i.severity = override_sev;
                }
                i
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Finding;
    use std::path::PathBuf;

    fn make_issue(rule_id: &str, severity: Severity, manual_review: bool) -> Issue {
        Issue {
            file: PathBuf::from("main.js"),
            severity,
            finding: Finding {
                line: 1,
                column: 0,
                rule_id: rule_id.into(),
                description: "test".into(),
                manual_review,
            },
        }
    }

    #[test]
    fn default_policy_fails_on_high() {
        let policy = Policy::default();
        let issues = vec![make_issue("NODE_INTEGRATION_JS_CHECK", Severity::High, false)];
        let verdict = policy.evaluate(&issues);
        assert!(!verdict.pass);
        assert_eq!(verdict.highest_severity, Some(Severity::High));
    }

    #[test]
    fn default_policy_passes_on_medium() {
        let policy = Policy::default();
        let issues = vec![make_issue("OTHER", Severity::Medium, false)];
        let verdict = policy.evaluate(&issues);
        assert!(verdict.pass);
    }

    #[test]
    fn ignore_rule_removes_finding() {
        let mut policy = Policy::default();
        policy.ignore_rules.insert("NODE_INTEGRATION_JS_CHECK".into());
        let issues = vec![make_issue("NODE_INTEGRATION_JS_CHECK", Severity::Critical, false)];
        let verdict = policy.evaluate(&issues);
        assert!(verdict.pass);
        assert_eq!(verdict.total_findings, 1);
        assert_eq!(verdict.effective_findings, 0);
        assert!(policy.apply(&issues).is_empty());
    }

    #[test]
    fn override_downgrades_severity() {
        let mut policy = Policy::default();
        policy
            .overrides
            .insert("NODE_INTEGRATION_JS_CHECK".into(), Severity::Info);
        let issues = vec![make_issue("NODE_INTEGRATION_JS_CHECK", Severity::Critical, false)];
        let verdict = policy.evaluate(&issues);
        assert!(verdict.pass);
        assert_eq!(policy.apply(&issues)[0].severity, Severity::Info);
    }

    #[test]
    fn manual_review_can_be_kept_out_of_the_verdict() {
        let mut policy = Policy::default();
        let issues = vec![make_issue("NODE_INTEGRATION_JS_CHECK", Severity::High, true)];
        assert!(!policy.evaluate(&issues).pass);

        policy.manual_review_fails = false;
        let verdict = policy.evaluate(&issues);
        assert!(verdict.pass);
        assert_eq!(verdict.effective_findings, 1);
        assert_eq!(verdict.manual_review_findings, 1);
    }
}
