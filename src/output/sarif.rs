use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::error::Result;
use crate::rules::{RuleEngine, RuleMetadata, Severity};
use crate::ScanReport;

static KNOWN_RULES: Lazy<BTreeMap<String, RuleMetadata>> = Lazy::new(|| {
    RuleEngine::default()
        .list_rules()
        .into_iter()
        .map(|rule| (rule.id.clone(), rule))
        .collect()
});

/// Render a report as SARIF 2.1.0.
///
/// Produces a self-contained SARIF log compatible with GitHub Code Scanning
/// and other SARIF consumers. Findings that need manual review are emitted at
/// `note` level and tagged with `properties.manualReview`.
pub fn render(report: &ScanReport) -> Result<String> {
    let rules: Vec<Value> = report
        .findings
        .iter()
        .map(|i| &i.finding.rule_id)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .map(|rule_id| {
            let mut rule = json!({ "id": rule_id });
            if let Some(meta) = KNOWN_RULES.get(rule_id) {
                rule["name"] = json!(meta.name);
                rule["shortDescription"] = json!({ "text": meta.description });
                rule["defaultConfiguration"] =
                    json!({ "level": severity_to_sarif_level(meta.default_severity) });
                if let Some(cwe) = &meta.cwe_id {
                    rule["properties"] = json!({ "tags": [cwe] });
                }
            }
            rule
        })
        .collect();

    let results: Vec<Value> = report
        .findings
        .iter()
        .map(|i| {
            let level = if i.finding.manual_review {
                "note"
            } else {
                severity_to_sarif_level(i.severity)
            };
            json!({
                "ruleId": i.finding.rule_id,
                "level": level,
                "message": { "text": i.finding.description },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": {
                            "uri": i.file.display().to_string(),
                        },
                        "region": {
                            "startLine": i.finding.line,
                            // SARIF columns are 1-based
                            "startColumn": i.finding.column + 1,
                        },
                    },
                }],
                "properties": { "manualReview": i.finding.manual_review },
            })
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "window-guard",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "invocations": [{
                "executionSuccessful": true,
                "startTimeUtc": report.started_at.to_rfc3339(),
            }],
            "results": results,
            "automationDetails": {
                "id": format!("windowguard/{}", report.target_name),
                "guid": uuid::Uuid::new_v4().to_string(),
            },
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Info => "note",
    }
}
