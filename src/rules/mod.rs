pub mod builtin;
pub mod finding;
pub mod policy;
pub mod property;

use std::path::Path;

use crate::ast::SyntaxNode;
use crate::config::CheckSettings;

pub use finding::{Finding, Issue, RuleMetadata, Severity};

/// A check looks at one syntax node at a time and reports findings for it.
///
/// Checks hold no state between calls; the engine may run them on any node in
/// any order.
pub trait Check: Send + Sync {
    /// Metadata about this rule (id, name, severity, CWE).
    fn metadata(&self) -> RuleMetadata;

    /// Inspect `node`. Nodes the check doesn't apply to yield nothing.
    fn match_node(&self, node: &SyntaxNode) -> Vec<Finding>;
}

/// The rule engine runs all registered checks against every node of a tree.
pub struct RuleEngine {
    checks: Vec<Box<dyn Check>>,
}

impl RuleEngine {
    /// Create a new engine with all built-in checks registered.
    pub fn new(settings: &CheckSettings) -> Self {
        Self {
            checks: builtin::all_checks(settings),
        }
    }

    /// Run all checks on every node of `tree`, in document order.
    pub fn run(&self, tree: &SyntaxNode) -> Vec<Finding> {
        tree.walk()
            .flat_map(|node| self.checks.iter().flat_map(move |c| c.match_node(node)))
            .collect()
    }

    /// Run all checks and attach file and default severity to each finding.
    pub fn run_file(&self, file: &Path, tree: &SyntaxNode) -> Vec<Issue> {
        let mut issues = Vec::new();
        for node in tree.walk() {
            for check in &self.checks {
                let findings = check.match_node(node);
                if findings.is_empty() {
                    continue;
                }
                let severity = check.metadata().default_severity;
                issues.extend(findings.into_iter().map(|finding| Issue {
                    file: file.to_path_buf(),
                    severity,
                    finding,
                }));
            }
        }
        issues
    }

    /// List metadata for all registered rules.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.checks.iter().map(|c| c.metadata()).collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(&CheckSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    fn program(statements: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::Other {
            loc: pos(1, 0),
            kind: "program".into(),
            children: statements,
        }
    }

    #[test]
    fn findings_follow_document_order() {
        let tree = program(vec![
            new_call("BrowserWindow", vec![], pos(1, 0)),
            new_call(
                "BrowserWindow",
                vec![object(
                    vec![prop("nodeIntegration", boolean(true, pos(3, 21)), pos(3, 4))],
                    pos(2, 18),
                )],
                pos(2, 0),
            ),
            new_call("BrowserWindow", vec![ident("options", pos(5, 18))], pos(5, 0)),
        ]);
        let findings = RuleEngine::default().run(&tree);
        let seen: Vec<(usize, bool)> = findings.iter().map(|f| (f.line, f.manual_review)).collect();
        assert_eq!(seen, vec![(1, false), (3, false), (5, true)]);
    }

    #[test]
    fn issues_carry_file_and_severity() {
        let tree = program(vec![new_call("BrowserWindow", vec![], pos(1, 0))]);
        let issues = RuleEngine::default().run_file(Path::new("main.js"), &tree);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file, Path::new("main.js"));
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn builtin_rules_are_listed() {
        let rules = RuleEngine::default().list_rules();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["NODE_INTEGRATION_JS_CHECK"]);
    }
}
