//! window-guard: finds Electron windows that give web content Node.js.
//!
//! Scans JavaScript/TypeScript sources for `new BrowserWindow(options)` and
//! reports options that leave `nodeIntegration` on (explicitly, through an
//! expression that needs manual review, or by omission) without a literal
//! `sandbox: true`. Offline, SARIF output.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use windowguard::{scan, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let report = scan(Path::new("./my-electron-app"), &options).unwrap();
//! println!("Pass: {}, Findings: {}", report.verdict.pass, report.findings.len());
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod rules;
pub mod source;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use config::{CheckSettings, Config};
use error::{GuardError, Result};
use output::OutputFormat;
use rules::policy::PolicyVerdict;
use rules::{Issue, RuleEngine};

/// Options for a scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Path to config file (defaults to `.windowguard.toml` in scan dir).
    pub config_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// CLI override for fail_on threshold.
    pub fail_on_override: Option<rules::Severity>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            fail_on_override: None,
        }
    }
}

/// Complete scan report.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub target_name: String,
    pub started_at: DateTime<Utc>,
    pub files_scanned: usize,
    pub findings: Vec<Issue>,
    pub verdict: PolicyVerdict,
}

/// Run a complete scan: collect sources, parse, check, evaluate policy.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanReport> {
    let started_at = Utc::now();

    // Load config
    let config_path = options.config_path.clone().unwrap_or_else(|| {
        let dir = if path.is_file() {
            path.parent().unwrap_or(Path::new("."))
        } else {
            path
        };
        dir.join(".windowguard.toml")
    });
    let mut config = Config::load(&config_path)?;

    // Apply CLI override
    if let Some(fail_on) = options.fail_on_override {
        config.policy.fail_on = fail_on;
    }

    let files = source::collect_source_files(path, &config.scan)?;
    if files.is_empty() {
        return Err(GuardError::NoSources(path.display().to_string()));
    }

    let engine = RuleEngine::new(&config.checks);
    let mut all_issues: Vec<Issue> = Vec::new();

    for file in &files {
        let tree = match parser::parse_source(&file.path, &file.content) {
            Ok(Some(tree)) => tree,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(file = %file.path.display(), error = %e, "parse failed, skipping");
                continue;
            }
        };
        let issues = engine.run_file(&file.path, &tree);
        tracing::debug!(
            file = %file.path.display(),
            language = %file.language,
            findings = issues.len(),
            "checked file"
        );
        all_issues.extend(issues);
    }

    let target_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".into());

    // Apply policy (ignore rules, overrides)
    let effective_issues = config.policy.apply(&all_issues);
    let verdict = config.policy.evaluate(&all_issues);

    Ok(ScanReport {
        target_name,
        started_at,
        files_scanned: files.len(),
        findings: effective_issues,
        verdict,
    })
}

/// Run the checks over one pre-parsed ESTree document. `file` only labels
/// the resulting issues.
pub fn check_estree(json: &str, file: &Path, settings: &CheckSettings) -> Result<Vec<Issue>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let tree = ast::estree::lower(&value);
    Ok(RuleEngine::new(settings).run_file(file, &tree))
}

/// Render a scan report in the specified format.
pub fn render_report(report: &ScanReport, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}
