//! Syntax tree that all checks operate on.
//!
//! Front ends (tree-sitter source parsing, ESTree JSON) lower into
//! `SyntaxNode`. Checks only ever see this closed set of variants, so a shape
//! they don't understand is an `Other` node rather than a missing field.

pub mod estree;
pub mod search;

use serde::{Deserialize, Serialize};

pub use search::find_node_by_type;

/// Start position of a node. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Discriminant of a `SyntaxNode`, used as the type filter for tree search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Call,
    ObjectLiteral,
    KeyValue,
    Identifier,
    Literal,
    Other,
}

/// `new X(...)` versus `X(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    New,
    Plain,
}

/// A value written directly in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum LiteralValue {
    Bool(bool),
    Number(f64),
    String(String),
    Null,
    Regex(String),
}

impl LiteralValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Null => write!(f, "null"),
            Self::Regex(r) => write!(f, "{r}"),
        }
    }
}

/// One node of a lowered syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "node")]
pub enum SyntaxNode {
    Call {
        loc: Position,
        kind: CallKind,
        callee: Box<SyntaxNode>,
        arguments: Vec<SyntaxNode>,
    },
    ObjectLiteral {
        loc: Position,
        properties: Vec<SyntaxNode>,
    },
    KeyValue {
        loc: Position,
        key: Box<SyntaxNode>,
        value: Box<SyntaxNode>,
        /// `[key]: value` form; the key is an expression, not a name.
        computed: bool,
    },
    Identifier {
        loc: Position,
        name: String,
    },
    Literal {
        loc: Position,
        value: LiteralValue,
    },
    /// Any construct checks don't look into directly. Children are kept so
    /// searches still reach nested objects and calls.
    Other {
        loc: Position,
        kind: String,
        children: Vec<SyntaxNode>,
    },
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Call { .. } => NodeKind::Call,
            Self::ObjectLiteral { .. } => NodeKind::ObjectLiteral,
            Self::KeyValue { .. } => NodeKind::KeyValue,
            Self::Identifier { .. } => NodeKind::Identifier,
            Self::Literal { .. } => NodeKind::Literal,
            Self::Other { .. } => NodeKind::Other,
        }
    }

    pub fn loc(&self) -> Position {
        match self {
            Self::Call { loc, .. }
            | Self::ObjectLiteral { loc, .. }
            | Self::KeyValue { loc, .. }
            | Self::Identifier { loc, .. }
            | Self::Literal { loc, .. }
            | Self::Other { loc, .. } => *loc,
        }
    }

    /// ESTree `type` tag for this node.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Call {
                kind: CallKind::New,
                ..
            } => "NewExpression",
            Self::Call { .. } => "CallExpression",
            Self::ObjectLiteral { .. } => "ObjectExpression",
            Self::KeyValue { .. } => "Property",
            Self::Identifier { .. } => "Identifier",
            Self::Literal { .. } => "Literal",
            Self::Other { kind, .. } => kind,
        }
    }

    /// Direct children in document order.
    pub fn children(&self) -> Vec<&SyntaxNode> {
        match self {
            Self::Call {
                callee, arguments, ..
            } => std::iter::once(callee.as_ref())
                .chain(arguments.iter())
                .collect(),
            Self::ObjectLiteral { properties, .. } => properties.iter().collect(),
            Self::KeyValue { key, value, .. } => vec![key.as_ref(), value.as_ref()],
            Self::Identifier { .. } | Self::Literal { .. } => Vec::new(),
            Self::Other { children, .. } => children.iter().collect(),
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn literal_value(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Every node of the tree, pre-order, document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`SyntaxNode::walk`]. Uses an explicit stack so deep
/// trees cannot overflow the call stack.
pub struct Walk<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}


#[cfg(test)]
mod tests {
    use super::builders::*;
    use super::*;

    #[test]
    fn walk_is_preorder_document_order() {
        let tree = new_call(
            "BrowserWindow",
            vec![object(
                vec![
                    prop("a", boolean(true, pos(1, 20)), pos(1, 18)),
                    prop("b", ident("x", pos(1, 29)), pos(1, 26)),
                ],
                pos(1, 17),
            )],
            pos(1, 0),
        );

        let kinds: Vec<NodeKind> = tree.walk().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Call,
                NodeKind::Identifier,
                NodeKind::ObjectLiteral,
                NodeKind::KeyValue,
                NodeKind::Identifier,
                NodeKind::Literal,
                NodeKind::KeyValue,
                NodeKind::Identifier,
                NodeKind::Identifier,
            ]
        );
    }

    #[test]
    fn type_tags_follow_estree() {
        assert_eq!(new_call("A", vec![], pos(1, 0)).type_tag(), "NewExpression");
        assert_eq!(call("a", vec![], pos(1, 0)).type_tag(), "CallExpression");
        assert_eq!(object(vec![], pos(1, 0)).type_tag(), "ObjectExpression");
        assert_eq!(
            prop("a", boolean(true, pos(1, 0)), pos(1, 0)).type_tag(),
            "Property"
        );
    }
}
