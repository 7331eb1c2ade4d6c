use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::rules::policy::Policy;
use crate::rules::property::DEFAULT_PROPERTY_DEPTH;

/// Top-level configuration from `.windowguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub checks: CheckSettings,
}

/// Which files a scan looks at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Glob patterns, relative to the scan root, of paths to skip.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Files larger than this many bytes are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_exclude() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**", "**/out/**", "**/*.min.js"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    1_048_576
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Tuning for the built-in checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSettings {
    /// How many tree levels below a configuration argument are searched for
    /// properties.
    #[serde(default = "default_property_depth")]
    pub property_depth: usize,
    /// Treat a `sandbox` option set from a variable as intentional and don't
    /// report it. When off, it becomes a manual-review finding. Either way it
    /// doesn't count as enabling the sandbox.
    #[serde(default = "default_true")]
    pub trust_dynamic_sandbox: bool,
}

fn default_property_depth() -> usize {
    DEFAULT_PROPERTY_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            property_depth: default_property_depth(),
            trust_dynamic_sandbox: true,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.checks.property_depth == 0 {
            return Err(GuardError::Config(
                "checks.property_depth must be at least 1".into(),
            ));
        }
        for pattern in &self.scan.exclude {
            glob::Pattern::new(pattern).map_err(|e| {
                GuardError::Config(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
        }
        Ok(())
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# window-guard configuration

[policy]
# Minimum severity to fail the scan (info, low, medium, high, critical).
fail_on = "high"

# Whether findings that need manual review count toward failing.
manual_review_fails = true

# Rule IDs to ignore entirely.
# ignore_rules = ["NODE_INTEGRATION_JS_CHECK"]

# Per-rule severity overrides.
# [policy.overrides]
# "NODE_INTEGRATION_JS_CHECK" = "medium"

[scan]
exclude = ["**/node_modules/**", "**/dist/**", "**/out/**", "**/*.min.js"]
max_file_size = 1048576

[checks]
# Levels below a BrowserWindow options argument searched for keys.
property_depth = 8

# Don't report `sandbox: someVariable`. Set to false to get a manual-review
# finding for it.
trust_dynamic_sandbox = true
"#
    }
}
