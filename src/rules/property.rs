//! Property resolution inside configuration object literals.
//!
//! A check that inspects an options object asks for one property at a time.
//! The resolver finds every key/value pair with that name below the object,
//! records whether its value is a literal or something computed at runtime,
//! and marks the occurrences its [`PropertyRule`] considers reportable.

use serde::Serialize;

use crate::ast::{find_node_by_type, LiteralValue, NodeKind, Position, SyntaxNode};

/// How deep below the configuration argument keys are searched. Deep enough
/// for `{ webPreferences: { ... } }` behind a cast or wrapper call.
pub const DEFAULT_PROPERTY_DEPTH: usize = 8;

/// Posture of a property that is not written at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPosture {
    /// The runtime default is the dangerous setting.
    Unsafe,
    Safe,
}

/// What to do with occurrences whose value isn't a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicValues {
    /// Always report, flagged for manual review.
    Report,
    /// Never report.
    Suppress,
}

/// Reporting policy for one property name.
#[derive(Clone, Copy)]
pub struct PropertyRule {
    pub name: &'static str,
    pub absent: AbsentPosture,
    /// Whether a literal value trips the rule.
    pub trips: fn(&LiteralValue) -> bool,
    pub dynamic: DynamicValues,
}

impl PropertyRule {
    pub fn with_dynamic(self, dynamic: DynamicValues) -> Self {
        Self { dynamic, ..self }
    }

    fn reports(&self, value: &ResolvedValue) -> bool {
        match value {
            ResolvedValue::Literal(v) => (self.trips)(v),
            ResolvedValue::Dynamic => self.dynamic == DynamicValues::Report,
        }
    }
}

/// Value of one occurrence as far as it can be known without evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedValue {
    Literal(LiteralValue),
    /// A reference, call or other expression.
    Dynamic,
}

/// One `name: value` pair found under the searched root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyOccurrence {
    pub name: &'static str,
    pub value: ResolvedValue,
    /// Location of the key.
    pub at: Position,
    pub is_dynamic: bool,
    /// The occurrence trips its rule and should become a finding.
    pub reported: bool,
}

impl PropertyOccurrence {
    /// Reported occurrences need manual review exactly when they are dynamic.
    pub fn manual_review(&self) -> bool {
        self.is_dynamic
    }

    pub fn literal(&self) -> Option<&LiteralValue> {
        match &self.value {
            ResolvedValue::Literal(v) => Some(v),
            ResolvedValue::Dynamic => None,
        }
    }
}

/// Every occurrence of one property, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub rule_name: &'static str,
    pub occurrences: Vec<PropertyOccurrence>,
}

impl Resolution {
    /// The property appears at least once, whatever its value.
    pub fn found(&self) -> bool {
        !self.occurrences.is_empty()
    }

    /// The occurrence that takes effect at runtime: with duplicate keys the
    /// last one written wins.
    pub fn effective(&self) -> Option<&PropertyOccurrence> {
        self.occurrences.last()
    }

    pub fn reported(&self) -> impl Iterator<Item = &PropertyOccurrence> {
        self.occurrences.iter().filter(|o| o.reported)
    }

    /// The effective value is exactly this literal.
    pub fn effectively(&self, expected: &LiteralValue) -> bool {
        self.effective()
            .and_then(PropertyOccurrence::literal)
            .is_some_and(|v| v == expected)
    }
}

/// Resolve all occurrences of `rule.name` beneath `root`.
///
/// `root` itself is never a candidate, and the search stops `depth` levels
/// down. A root that isn't an object literal simply has no occurrences.
pub fn resolve(root: &SyntaxNode, rule: &PropertyRule, depth: usize) -> Resolution {
    let occurrences = find_node_by_type(root, NodeKind::KeyValue, depth, false, |node| {
        key_matches(node, rule.name)
    })
    .into_iter()
    .filter_map(|node| match node {
        SyntaxNode::KeyValue { key, value, .. } => {
            let resolved = match value.literal_value() {
                Some(v) => ResolvedValue::Literal(v.clone()),
                None => ResolvedValue::Dynamic,
            };
            Some(PropertyOccurrence {
                name: rule.name,
                is_dynamic: resolved == ResolvedValue::Dynamic,
                reported: rule.reports(&resolved),
                value: resolved,
                at: key.loc(),
            })
        }
        _ => None,
    })
    .collect();

    Resolution {
        rule_name: rule.name,
        occurrences,
    }
}

/// Objects may key a property by bare identifier or by string literal. A
/// computed `[name]` key refers to a variable, not the property `name`.
fn key_matches(node: &SyntaxNode, name: &str) -> bool {
    let SyntaxNode::KeyValue { key, computed, .. } = node else {
        return false;
    };
    match key.as_ref() {
        SyntaxNode::Identifier { name: key_name, .. } => !computed && key_name == name,
        SyntaxNode::Literal {
            value: LiteralValue::String(key_name),
            ..
        } => key_name == name,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;

    fn is_true(value: &LiteralValue) -> bool {
        value.as_bool() == Some(true)
    }

    const FLAG: PropertyRule = PropertyRule {
        name: "flag",
        absent: AbsentPosture::Safe,
        trips: is_true,
        dynamic: DynamicValues::Report,
    };

    #[test]
    fn absent_property_is_not_found() {
        let config = object(vec![prop("other", boolean(true, pos(1, 8)), pos(1, 1))], pos(1, 0));
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert!(!resolution.found());
        assert!(resolution.effective().is_none());
    }

    #[test]
    fn safe_literal_is_found_but_not_reported() {
        let config = object(vec![prop("flag", boolean(false, pos(1, 7)), pos(1, 1))], pos(1, 0));
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert!(resolution.found());
        assert_eq!(resolution.reported().count(), 0);
    }

    #[test]
    fn dynamic_value_reported_for_manual_review() {
        let config = object(vec![prop("flag", ident("x", pos(2, 8)), pos(2, 2))], pos(1, 0));
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        let reported: Vec<_> = resolution.reported().collect();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].manual_review());
        assert_eq!(reported[0].at, pos(2, 2));
    }

    #[test]
    fn dynamic_value_suppressed_when_policy_says_so() {
        let rule = FLAG.with_dynamic(DynamicValues::Suppress);
        let config = object(vec![prop("flag", ident("x", pos(2, 8)), pos(2, 2))], pos(1, 0));
        let resolution = resolve(&config, &rule, DEFAULT_PROPERTY_DEPTH);
        assert!(resolution.found());
        assert_eq!(resolution.reported().count(), 0);
    }

    #[test]
    fn last_duplicate_is_effective_but_all_are_reported() {
        let config = object(
            vec![
                prop("flag", boolean(true, pos(1, 7)), pos(1, 1)),
                prop("flag", boolean(false, pos(1, 19)), pos(1, 13)),
                prop("flag", boolean(true, pos(1, 32)), pos(1, 26)),
            ],
            pos(1, 0),
        );
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert_eq!(resolution.occurrences.len(), 3);
        assert_eq!(resolution.effective().unwrap().at, pos(1, 26));
        assert!(resolution.effectively(&LiteralValue::Bool(true)));
        let columns: Vec<usize> = resolution.reported().map(|o| o.at.column).collect();
        assert_eq!(columns, vec![1, 26]);
    }

    #[test]
    fn string_keys_match_and_computed_identifiers_do_not() {
        let config = object(
            vec![
                SyntaxNode::KeyValue {
                    loc: pos(1, 1),
                    key: Box::new(string("flag", pos(1, 1))),
                    value: Box::new(boolean(true, pos(1, 9))),
                    computed: false,
                },
                SyntaxNode::KeyValue {
                    loc: pos(2, 1),
                    key: Box::new(ident("flag", pos(2, 2))),
                    value: Box::new(boolean(true, pos(2, 10))),
                    computed: true,
                },
            ],
            pos(1, 0),
        );
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert_eq!(resolution.occurrences.len(), 1);
        assert_eq!(resolution.occurrences[0].at, pos(1, 1));
    }

    #[test]
    fn nested_objects_are_searched() {
        let config = object(
            vec![prop(
                "webPreferences",
                object(vec![prop("flag", boolean(true, pos(2, 10)), pos(2, 4))], pos(1, 18)),
                pos(1, 2),
            )],
            pos(1, 0),
        );
        let resolution = resolve(&config, &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert_eq!(resolution.reported().count(), 1);
        assert_eq!(resolve(&config, &FLAG, 2).occurrences.len(), 0);
    }

    #[test]
    fn non_object_root_has_no_occurrences() {
        let resolution = resolve(&ident("options", pos(1, 0)), &FLAG, DEFAULT_PROPERTY_DEPTH);
        assert!(!resolution.found());
    }
}
