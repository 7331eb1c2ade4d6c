//! Property tests for the BrowserWindow nodeIntegration check over randomly
//! shaped option objects.

use proptest::prelude::*;

use windowguard::ast::{CallKind, LiteralValue, Position, SyntaxNode};
use windowguard::rules::builtin::node_integration::NodeIntegrationCheck;
use windowguard::rules::{Check, Finding};

const CALL_SITE: Position = Position { line: 1, column: 0 };

#[derive(Debug, Clone)]
enum Value {
    Bool(bool),
    Text(String),
    Reference,
    Call,
}

impl Value {
    fn node(&self, loc: Position) -> SyntaxNode {
        match self {
            Self::Bool(b) => SyntaxNode::Literal {
                loc,
                value: LiteralValue::Bool(*b),
            },
            Self::Text(s) => SyntaxNode::Literal {
                loc,
                value: LiteralValue::String(s.clone()),
            },
            Self::Reference => SyntaxNode::Identifier {
                loc,
                name: "options".into(),
            },
            Self::Call => SyntaxNode::Call {
                loc,
                kind: CallKind::Plain,
                callee: Box::new(SyntaxNode::Identifier {
                    loc,
                    name: "getFlag".into(),
                }),
                arguments: vec![],
            },
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::Reference | Self::Call)
    }
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        "[a-z]{0,6}".prop_map(Value::Text),
        Just(Value::Reference),
        Just(Value::Call),
    ]
}

fn key() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("nodeIntegration"),
        Just("nodeIntegrationInWorker"),
        Just("sandbox"),
        Just("contextIsolation"),
        Just("width"),
    ]
}

/// Properties one per line starting at line 2, optionally nested under
/// `webPreferences`.
fn options(entries: &[(&'static str, Value)], nested: bool) -> SyntaxNode {
    let properties: Vec<SyntaxNode> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let at = Position::new(i + 2, 4);
            SyntaxNode::KeyValue {
                loc: at,
                key: Box::new(SyntaxNode::Identifier {
                    loc: at,
                    name: name.to_string(),
                }),
                value: Box::new(value.node(Position::new(i + 2, 20))),
                computed: false,
            }
        })
        .collect();
    let inner = SyntaxNode::ObjectLiteral {
        loc: Position::new(1, 18),
        properties,
    };
    if !nested {
        return inner;
    }
    SyntaxNode::ObjectLiteral {
        loc: Position::new(1, 18),
        properties: vec![SyntaxNode::KeyValue {
            loc: Position::new(1, 20),
            key: Box::new(SyntaxNode::Identifier {
                loc: Position::new(1, 20),
                name: "webPreferences".into(),
            }),
            value: Box::new(inner),
            computed: false,
        }],
    }
}

fn window(arguments: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::Call {
        loc: CALL_SITE,
        kind: CallKind::New,
        callee: Box::new(SyntaxNode::Identifier {
            loc: CALL_SITE,
            name: "BrowserWindow".into(),
        }),
        arguments,
    }
}

fn check(node: &SyntaxNode) -> Vec<Finding> {
    NodeIntegrationCheck::default().match_node(node)
}

fn sandbox_enabled(entries: &[(&'static str, Value)]) -> bool {
    entries
        .iter()
        .filter(|(k, _)| *k == "sandbox")
        .last()
        .is_some_and(|(_, v)| matches!(v, Value::Bool(true)))
}

fn entries() -> impl Strategy<Value = Vec<(&'static str, Value)>> {
    prop::collection::vec((key(), value()), 0..8)
}

proptest! {
    #[test]
    fn omitted_primary_gives_exactly_one_call_site_finding(
        entries in prop::collection::vec(
            (prop_oneof![Just("sandbox"), Just("width"), Just("contextIsolation")], value()),
            0..6,
        ),
        nested in any::<bool>(),
    ) {
        let findings = check(&window(vec![options(&entries, nested)]));
        let at_call_site: Vec<&Finding> =
            findings.iter().filter(|f| f.position() == CALL_SITE).collect();
        prop_assert_eq!(findings.len(), 1);
        prop_assert_eq!(at_call_site.len(), 1);
        prop_assert!(!findings[0].manual_review);
    }

    #[test]
    fn literal_sandbox_true_neutralizes_privilege_findings(
        mut entries in entries(),
        nested in any::<bool>(),
    ) {
        entries.push(("sandbox", Value::Bool(true)));
        let findings = check(&window(vec![options(&entries, nested)]));
        // only the omission finding can survive
        prop_assert!(findings.iter().all(|f| f.position() == CALL_SITE));
    }

    #[test]
    fn dynamic_privilege_values_always_need_review(
        entries in entries(),
        nested in any::<bool>(),
    ) {
        prop_assume!(!sandbox_enabled(&entries));
        let findings = check(&window(vec![options(&entries, nested)]));
        for (i, (name, value)) in entries.iter().enumerate() {
            let privileged = *name == "nodeIntegration" || *name == "nodeIntegrationInWorker";
            if privileged && value.is_dynamic() {
                let at = Position::new(i + 2, 4);
                prop_assert!(
                    findings.iter().any(|f| f.position() == at && f.manual_review),
                    "no manual-review finding for {} at {}", name, at
                );
            }
        }
    }

    #[test]
    fn unsafe_last_primary_is_reported(
        mut entries in entries(),
        nested in any::<bool>(),
    ) {
        prop_assume!(!sandbox_enabled(&entries));
        entries.push(("nodeIntegration", Value::Bool(true)));
        let at = Position::new(entries.len() + 1, 4);
        let findings = check(&window(vec![options(&entries, nested)]));
        prop_assert!(findings.iter().any(|f| f.position() == at && !f.manual_review));
    }

    #[test]
    fn manual_review_only_for_dynamic_values(
        entries in entries(),
        nested in any::<bool>(),
    ) {
        let findings = check(&window(vec![options(&entries, nested)]));
        for f in findings.iter().filter(|f| f.position() != CALL_SITE) {
            let (_, value) = &entries[f.line - 2];
            prop_assert_eq!(f.manual_review, value.is_dynamic());
        }
    }

    #[test]
    fn non_literal_options_need_review(dynamic in prop_oneof![Just(Value::Reference), Just(Value::Call)]) {
        let findings = check(&window(vec![dynamic.node(Position::new(1, 18))]));
        prop_assert_eq!(findings.len(), 1);
        prop_assert!(findings[0].manual_review);
        prop_assert_eq!(findings[0].position(), CALL_SITE);
    }

    #[test]
    fn checking_is_idempotent(entries in entries(), nested in any::<bool>()) {
        let node = window(vec![options(&entries, nested)]);
        let check = NodeIntegrationCheck::default();
        prop_assert_eq!(check.match_node(&node), check.match_node(&node));
    }
}
