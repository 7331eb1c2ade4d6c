use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ast::Position;

/// A finding produced by a check for one syntax node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based line of the most specific node available.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
    /// Stable rule identifier (e.g., "NODE_INTEGRATION_JS_CHECK").
    pub rule_id: String,
    /// Fixed human-readable rule description.
    pub description: String,
    /// The deciding value could not be evaluated statically; a human has to
    /// judge whether the configuration is unsafe.
    pub manual_review: bool,
}

impl Finding {
    pub fn new(rule: &RuleMetadata, at: Position, manual_review: bool) -> Self {
        Self {
            line: at.line,
            column: at.column,
            rule_id: rule.id.clone(),
            description: rule.description.clone(),
            manual_review,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

/// A finding placed in a scanned file, with its effective severity. This is
/// what policy and renderers work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub file: PathBuf,
    pub severity: Severity,
    #[serde(flatten)]
    pub finding: Finding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Metadata about a check, used for `list-rules` output and SARIF rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_severity: Severity,
    pub cwe_id: Option<String>,
}
