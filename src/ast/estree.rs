//! Lowering of ESTree-shaped JSON (as produced by espree, acorn, esprima or
//! Babel) into [`SyntaxNode`].
//!
//! The input is duck-typed: every field is checked where it is used, and a
//! node that doesn't have the expected shape falls back to `Other`, so a
//! malformed document lowers to a tree with fewer recognizable nodes rather
//! than an error.

use serde_json::{Map, Value};

use super::{CallKind, LiteralValue, Position, SyntaxNode};

/// Fields that never hold child nodes.
const NON_CHILD_FIELDS: &[&str] = &["type", "loc", "range", "start", "end", "extra", "comments", "tokens"];

/// Lower an ESTree node. Non-object input lowers to an empty `Other`.
pub fn lower(value: &Value) -> SyntaxNode {
    let Some(node) = value.as_object() else {
        return SyntaxNode::Other {
            loc: Position::default(),
            kind: "Invalid".into(),
            children: Vec::new(),
        };
    };

    let loc = position(node);
    let tag = node.get("type").and_then(Value::as_str).unwrap_or("Unknown");

    match tag {
        "NewExpression" | "CallExpression" => lower_call(node, tag, loc),
        "ObjectExpression" => SyntaxNode::ObjectLiteral {
            loc,
            properties: node_list(node.get("properties")),
        },
        "Property" | "ObjectProperty" => lower_property(node, loc),
        "Identifier" => match node.get("name").and_then(Value::as_str) {
            Some(name) => SyntaxNode::Identifier {
                loc,
                name: name.to_string(),
            },
            None => other(node, tag, loc),
        },
        "Literal" => match literal_value(node) {
            Some(value) => SyntaxNode::Literal { loc, value },
            None => other(node, tag, loc),
        },
        "StringLiteral" => match node.get("value").and_then(Value::as_str) {
            Some(s) => SyntaxNode::Literal {
                loc,
                value: LiteralValue::String(s.to_string()),
            },
            None => other(node, tag, loc),
        },
        "BooleanLiteral" => match node.get("value").and_then(Value::as_bool) {
            Some(b) => SyntaxNode::Literal {
                loc,
                value: LiteralValue::Bool(b),
            },
            None => other(node, tag, loc),
        },
        "NumericLiteral" => match node.get("value").and_then(Value::as_f64) {
            Some(n) => SyntaxNode::Literal {
                loc,
                value: LiteralValue::Number(n),
            },
            None => other(node, tag, loc),
        },
        "NullLiteral" => SyntaxNode::Literal {
            loc,
            value: LiteralValue::Null,
        },
        _ => other(node, tag, loc),
    }
}

fn lower_call(node: &Map<String, Value>, tag: &str, loc: Position) -> SyntaxNode {
    let Some(callee) = node.get("callee").filter(|c| c.is_object()) else {
        return other(node, tag, loc);
    };
    let kind = if tag == "NewExpression" {
        CallKind::New
    } else {
        CallKind::Plain
    };
    SyntaxNode::Call {
        loc,
        kind,
        callee: Box::new(lower(callee)),
        arguments: node_list(node.get("arguments")),
    }
}

fn lower_property(node: &Map<String, Value>, loc: Position) -> SyntaxNode {
    match (node.get("key"), node.get("value")) {
        (Some(key), Some(value)) if key.is_object() && value.is_object() => SyntaxNode::KeyValue {
            loc,
            key: Box::new(lower(key)),
            value: Box::new(lower(value)),
            computed: node
                .get("computed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        },
        _ => other(node, "Property", loc),
    }
}

/// ESTree `Literal.value`. Regex literals carry `regex.pattern`; bigint
/// literals have a null value and are reported as dynamic `Other`.
fn literal_value(node: &Map<String, Value>) -> Option<LiteralValue> {
    if let Some(regex) = node.get("regex").and_then(Value::as_object) {
        let pattern = regex.get("pattern").and_then(Value::as_str).unwrap_or("");
        let flags = regex.get("flags").and_then(Value::as_str).unwrap_or("");
        return Some(LiteralValue::Regex(format!("/{pattern}/{flags}")));
    }
    if node.contains_key("bigint") {
        return None;
    }
    match node.get("value")? {
        Value::Bool(b) => Some(LiteralValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(LiteralValue::Number),
        Value::String(s) => Some(LiteralValue::String(s.clone())),
        Value::Null => Some(LiteralValue::Null),
        _ => None,
    }
}

fn other(node: &Map<String, Value>, tag: &str, loc: Position) -> SyntaxNode {
    let mut children: Vec<SyntaxNode> = node
        .iter()
        .filter(|(field, _)| !NON_CHILD_FIELDS.contains(&field.as_str()))
        .flat_map(|(_, value)| match value {
            Value::Object(_) if is_node(value) => vec![lower(value)],
            Value::Array(items) => items.iter().filter(|v| is_node(v)).map(lower).collect(),
            _ => Vec::new(),
        })
        .collect();
    // serde_json maps don't keep field order; source position restores it.
    children.sort_by_key(SyntaxNode::loc);

    SyntaxNode::Other {
        loc,
        kind: tag.to_string(),
        children,
    }
}

fn node_list(value: Option<&Value>) -> Vec<SyntaxNode> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter(|v| is_node(v)).map(lower).collect())
        .unwrap_or_default()
}

fn is_node(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

fn position(node: &Map<String, Value>) -> Position {
    let start = node.get("loc").and_then(|loc| loc.get("start"));
    let field = |name: &str| {
        start
            .and_then(|s| s.get(name))
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    };
    Position::new(field("line"), field("column"))
}
