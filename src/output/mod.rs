pub mod console;
pub mod json;
pub mod sarif;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ScanReport;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Sarif,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "sarif" => Some(Self::Sarif),
            _ => None,
        }
    }
}

/// Render a report into the specified format.
pub fn render(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(&report.findings, &report.verdict)),
        OutputFormat::Json => json::render(report),
        OutputFormat::Sarif => sarif::render(report),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use crate::rules::policy::Policy;
    use crate::rules::{Finding, Issue, Severity};
    use crate::ScanReport;

    pub fn issue(file: &str, line: usize, manual_review: bool) -> Issue {
        Issue {
            file: PathBuf::from(file),
            severity: Severity::High,
            finding: Finding {
                line,
                column: 4,
                rule_id: "NODE_INTEGRATION_JS_CHECK".into(),
                description: "Disable nodeIntegration for untrusted origins".into(),
                manual_review,
            },
        }
    }

    pub fn report(findings: Vec<Issue>) -> ScanReport {
        let verdict = Policy::default().evaluate(&findings);
        ScanReport {
            target_name: "app".into(),
            started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            files_scanned: 3,
            findings,
            verdict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_parse_leniently() {
        assert_eq!(OutputFormat::from_str_lenient("SARIF"), Some(OutputFormat::Sarif));
        assert_eq!(OutputFormat::from_str_lenient("text"), Some(OutputFormat::Console));
        assert_eq!(OutputFormat::from_str_lenient("html"), None);
    }
}
