//! Electron `BrowserWindow` check: renderers that get Node.js.
//!
//! Electron exposes `require` and the rest of Node.js to a window's web
//! content when `nodeIntegration` is on (the default before Electron 5) or
//! when `nodeIntegrationInWorker` is on, unless the renderer is sandboxed.
//! Loading remote or otherwise untrusted content into such a window hands
//! it the user's machine.

use crate::ast::{LiteralValue, SyntaxNode};
use crate::config::CheckSettings;
use crate::rules::property::{
    resolve, AbsentPosture, DynamicValues, PropertyOccurrence, PropertyRule, Resolution,
};
use crate::rules::{Check, Finding, RuleMetadata, Severity};

pub const RULE_ID: &str = "NODE_INTEGRATION_JS_CHECK";
pub const DESCRIPTION: &str = "Disable nodeIntegration for untrusted origins";

/// The window-creating construct whose options are inspected.
const TARGET_CONSTRUCT: &str = "BrowserWindow";

/// `nodeIntegration`: Node.js in the renderer. Older Electron enabled it by
/// default, so leaving it out is unsafe; only a literal `false` is safe.
pub const NODE_INTEGRATION: PropertyRule = PropertyRule {
    name: "nodeIntegration",
    absent: AbsentPosture::Unsafe,
    trips: is_not_false,
    dynamic: DynamicValues::Report,
};

/// `nodeIntegrationInWorker`: Node.js in web workers. Off by default.
pub const NODE_INTEGRATION_IN_WORKER: PropertyRule = PropertyRule {
    name: "nodeIntegrationInWorker",
    absent: AbsentPosture::Safe,
    trips: is_true,
    dynamic: DynamicValues::Report,
};

/// `sandbox`: a literal `true` disables Node.js in the renderer whatever the
/// two flags above say. Here "trips" means "enables the sandbox".
///
/// A sandbox flag held in a variable never counts as enabling the sandbox.
/// By default it is trusted and not reported (`checks.trust_dynamic_sandbox`);
/// with trust off, it gets its own manual-review finding.
pub const SANDBOX: PropertyRule = PropertyRule {
    name: "sandbox",
    absent: AbsentPosture::Safe,
    trips: is_true,
    dynamic: DynamicValues::Suppress,
};

fn is_true(value: &LiteralValue) -> bool {
    value.as_bool() == Some(true)
}

fn is_not_false(value: &LiteralValue) -> bool {
    value.as_bool() != Some(false)
}

/// NODE_INTEGRATION_JS_CHECK: renderer with Node.js integration.
///
/// Flags `new BrowserWindow(options)` where `options` leaves Node.js
/// integration on (explicitly, dynamically, or by omission) and does not
/// turn the sandbox on with a literal `true`.
pub struct NodeIntegrationCheck {
    depth: usize,
    sandbox: PropertyRule,
}

impl NodeIntegrationCheck {
    pub fn new(settings: &CheckSettings) -> Self {
        let dynamic = if settings.trust_dynamic_sandbox {
            DynamicValues::Suppress
        } else {
            DynamicValues::Report
        };
        Self {
            depth: settings.property_depth,
            sandbox: SANDBOX.with_dynamic(dynamic),
        }
    }

    fn metadata_static() -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID.into(),
            name: "Node.js Integration Enabled".into(),
            description: DESCRIPTION.into(),
            default_severity: Severity::High,
            cwe_id: Some("CWE-829".into()),
        }
    }

    /// The sandbox is on for certain only if the last `sandbox` key is a
    /// literal `true`. A reported dynamic value proves nothing.
    fn sandboxed(sandbox: &Resolution) -> bool {
        sandbox
            .effective()
            .is_some_and(|o| o.reported && !o.is_dynamic)
    }

    /// Untrusted `sandbox` keys whose value is only known at runtime.
    fn unverified_sandbox(sandbox: &Resolution) -> impl Iterator<Item = &PropertyOccurrence> {
        sandbox.reported().filter(|o| o.is_dynamic)
    }
}

impl Default for NodeIntegrationCheck {
    fn default() -> Self {
        Self::new(&CheckSettings::default())
    }
}

impl Check for NodeIntegrationCheck {
    fn metadata(&self) -> RuleMetadata {
        Self::metadata_static()
    }

    fn match_node(&self, node: &SyntaxNode) -> Vec<Finding> {
        let SyntaxNode::Call {
            loc,
            callee,
            arguments,
            ..
        } = node
        else {
            return Vec::new();
        };
        if callee.identifier_name() != Some(TARGET_CONSTRUCT) {
            return Vec::new();
        }

        let rule = Self::metadata_static();
        let mut findings = Vec::new();
        let mut unsafe_by_omission = true;

        if let Some(config) = arguments.first() {
            let privileges = [
                resolve(config, &NODE_INTEGRATION, self.depth),
                resolve(config, &NODE_INTEGRATION_IN_WORKER, self.depth),
            ];
            let sandbox = resolve(config, &self.sandbox, self.depth);

            if !Self::sandboxed(&sandbox) {
                findings.extend(
                    privileges
                        .iter()
                        .flat_map(|r| r.reported())
                        .map(|o| Finding::new(&rule, o.at, o.manual_review())),
                );
                findings.extend(
                    Self::unverified_sandbox(&sandbox)
                        .map(|o| Finding::new(&rule, o.at, o.manual_review())),
                );
            }

            unsafe_by_omission = privileges
                .iter()
                .zip([NODE_INTEGRATION, NODE_INTEGRATION_IN_WORKER])
                .any(|(resolution, property)| {
                    property.absent == AbsentPosture::Unsafe && !resolution.found()
                });
        }

        if unsafe_by_omission {
            // The options may come from elsewhere; only a literal object
            // proves the property really is missing.
            let manual_review = arguments
                .first()
                .is_some_and(|config| !matches!(config, SyntaxNode::ObjectLiteral { .. }));
            findings.push(Finding::new(&rule, *loc, manual_review));
        }

        tracing::debug!(
            line = loc.line,
            column = loc.column,
            findings = findings.len(),
            "checked BrowserWindow options"
        );

        findings
    }
}
