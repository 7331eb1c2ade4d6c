use std::path::Path;

use tree_sitter::Node;

use super::{Language, LanguageParser};
use crate::ast::{CallKind, LiteralValue, Position, SyntaxNode};
use crate::error::{GuardError, Result};

/// tree-sitter based parser for JavaScript, TypeScript and their JSX
/// dialects.
///
/// Plain JavaScript goes through the TSX grammar, which accepts JSX and is a
/// superset of the JS syntax Electron apps use. `.ts` files need the
/// TypeScript grammar because `<T>expr` casts are ambiguous with JSX.
pub struct TypeScriptParser {
    language: Language,
}

impl TypeScriptParser {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl LanguageParser for TypeScriptParser {
    fn language(&self) -> Language {
        self.language
    }

    fn parse_file(&self, path: &Path, content: &str) -> Result<SyntaxNode> {
        let mut parser = tree_sitter::Parser::new();

        let grammar = match self.language {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
            _ => tree_sitter_typescript::LANGUAGE_TSX,
        };

        parser
            .set_language(&grammar.into())
            .map_err(|e| GuardError::Parse {
                file: path.display().to_string(),
                message: format!("Failed to load {} grammar: {e}", self.language),
            })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| GuardError::Parse {
                file: path.display().to_string(),
                message: format!("tree-sitter failed to parse {}", self.language),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            tracing::warn!(
                file = %path.display(),
                "syntax errors in source, checking the recoverable parts"
            );
        }

        let mut lowering = Lowering::new(content.as_bytes());
        let lowered = lowering.lower(root, 0);
        if lowering.truncated {
            tracing::warn!(
                file = %path.display(),
                max_depth = MAX_NESTING,
                "source nests too deeply, deeper subtrees were not checked"
            );
        }
        Ok(lowered)
    }
}

/// Tree-sitter levels lowered below the program node. Anything deeper
/// becomes an empty `Other`.
const MAX_NESTING: usize = 256;

/// Lowers a tree-sitter tree into `SyntaxNode`s.
struct Lowering<'a> {
    source: &'a [u8],
    truncated: bool,
}

impl<'a> Lowering<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            truncated: false,
        }
    }

    fn lower(&mut self, node: Node, depth: usize) -> SyntaxNode {
        let loc = self.position(node);

        if depth >= MAX_NESTING {
            self.truncated = true;
            return SyntaxNode::Other {
                loc,
                kind: node.kind().to_string(),
                children: Vec::new(),
            };
        }

        match node.kind() {
            "new_expression" => {
                let callee = node.child_by_field_name("constructor");
                let arguments = node.child_by_field_name("arguments");
                match callee {
                    Some(callee) => self.call(CallKind::New, loc, callee, arguments, depth),
                    None => self.other(node, depth),
                }
            }
            "call_expression" => {
                let callee = node.child_by_field_name("function");
                let arguments = node.child_by_field_name("arguments");
                // Tagged templates put a template_string in the arguments slot.
                match (callee, arguments) {
                    (Some(callee), Some(args)) if args.kind() == "arguments" => {
                        self.call(CallKind::Plain, loc, callee, Some(args), depth)
                    }
                    _ => self.other(node, depth),
                }
            }
            "object" => SyntaxNode::ObjectLiteral {
                loc,
                properties: self.lowered_children(node, depth),
            },
            "pair" => {
                let key = node.child_by_field_name("key");
                let value = node.child_by_field_name("value");
                match (key, value) {
                    (Some(key), Some(value)) => {
                        let (key, computed) = self.lower_key(key, depth + 1);
                        SyntaxNode::KeyValue {
                            loc,
                            key: Box::new(key),
                            value: Box::new(self.lower(value, depth + 1)),
                            computed,
                        }
                    }
                    _ => self.other(node, depth),
                }
            }
            // `{ sandbox }` is `{ sandbox: sandbox }`
            "shorthand_property_identifier" => {
                let name = node_text(node, self.source).to_string();
                SyntaxNode::KeyValue {
                    loc,
                    key: Box::new(SyntaxNode::Identifier {
                        loc,
                        name: name.clone(),
                    }),
                    value: Box::new(SyntaxNode::Identifier { loc, name }),
                    computed: false,
                }
            }
            "identifier" | "property_identifier" | "shorthand_property_identifier_pattern" => {
                SyntaxNode::Identifier {
                    loc,
                    name: node_text(node, self.source).to_string(),
                }
            }
            "true" => literal(loc, LiteralValue::Bool(true)),
            "false" => literal(loc, LiteralValue::Bool(false)),
            "null" => literal(loc, LiteralValue::Null),
            "string" => literal(loc, LiteralValue::String(string_value(node, self.source))),
            "template_string" => {
                if has_named_child(node, "template_substitution") {
                    self.other(node, depth)
                } else {
                    literal(loc, LiteralValue::String(string_value(node, self.source)))
                }
            }
            "number" => match parse_number(node_text(node, self.source)) {
                Some(n) => literal(loc, LiteralValue::Number(n)),
                None => self.other(node, depth),
            },
            "regex" => literal(
                loc,
                LiteralValue::Regex(node_text(node, self.source).to_string()),
            ),
            "parenthesized_expression" => match first_named_child(node) {
                Some(inner) => self.lower(inner, depth + 1),
                None => self.other(node, depth),
            },
            _ => self.other(node, depth),
        }
    }

    fn call(
        &mut self,
        kind: CallKind,
        loc: Position,
        callee: Node,
        arguments: Option<Node>,
        depth: usize,
    ) -> SyntaxNode {
        SyntaxNode::Call {
            loc,
            kind,
            callee: Box::new(self.lower(callee, depth + 1)),
            arguments: arguments
                .map(|args| self.lowered_children(args, depth + 1))
                .unwrap_or_default(),
        }
    }

    /// Lower an object key. Returns the key node and whether it is computed.
    ///
    /// `["sandbox"]: true` is the same property as `sandbox: true`, so a
    /// computed key holding a plain string literal lowers to that literal.
    fn lower_key(&mut self, key: Node, depth: usize) -> (SyntaxNode, bool) {
        if key.kind() != "computed_property_name" {
            return (self.lower(key, depth), false);
        }
        match first_named_child(key) {
            Some(inner) => {
                let lowered = self.lower(inner, depth + 1);
                let plain_string = matches!(
                    lowered,
                    SyntaxNode::Literal {
                        value: LiteralValue::String(_),
                        ..
                    }
                );
                (lowered, !plain_string)
            }
            None => (self.other(key, depth), true),
        }
    }

    fn other(&mut self, node: Node, depth: usize) -> SyntaxNode {
        SyntaxNode::Other {
            loc: self.position(node),
            kind: node.kind().to_string(),
            children: self.lowered_children(node, depth),
        }
    }

    /// Named children of `node`, one level down.
    fn lowered_children(&mut self, node: Node, depth: usize) -> Vec<SyntaxNode> {
        let mut children = Vec::new();
        for i in 0..node.named_child_count() {
            if let Some(child) = node.named_child(i) {
                if child.kind() != "comment" {
                    children.push(self.lower(child, depth + 1));
                }
            }
        }
        children
    }

    /// 1-based line and 0-based column in UTF-16 code units, as ESTree
    /// parsers report them. Tree-sitter columns are byte offsets.
    fn position(&self, node: Node) -> Position {
        let start = node.start_position();
        let end = node.start_byte();
        let line_start = end.saturating_sub(start.column);
        let column = self
            .source
            .get(line_start..end)
            .and_then(|prefix| std::str::from_utf8(prefix).ok())
            .map(|prefix| prefix.encode_utf16().count())
            .unwrap_or(start.column);
        Position::new(start.row + 1, column)
    }
}

fn literal(loc: Position, value: LiteralValue) -> SyntaxNode {
    SyntaxNode::Literal { loc, value }
}

fn first_named_child(node: Node) -> Option<Node> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .find(|child| child.kind() != "comment")
}

fn has_named_child(node: Node, kind: &str) -> bool {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .any(|child| child.kind() == kind)
}

/// Contents of a string or substitution-free template, escapes decoded.
fn string_value(node: Node, source: &[u8]) -> String {
    let mut value = String::new();
    for i in 0..node.named_child_count() {
        let Some(part) = node.named_child(i) else {
            continue;
        };
        match part.kind() {
            "string_fragment" => value.push_str(node_text(part, source)),
            "escape_sequence" => value.push_str(&unescape(node_text(part, source))),
            _ => {}
        }
    }
    value
}

fn unescape(sequence: &str) -> String {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    match body {
        "n" => "\n".into(),
        "t" => "\t".into(),
        "r" => "\r".into(),
        "0" => "\0".into(),
        _ if body.starts_with('u') || body.starts_with('x') => {
            let hex = body[1..].trim_matches(|c| c == '{' || c == '}');
            u32::from_str_radix(hex, 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        }
        // Line continuations produce nothing.
        _ if body.starts_with('\n') || body.starts_with('\r') => String::new(),
        _ => body.to_string(),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.replace('_', "");
    let radix = |prefix: &[&str], radix: u32| {
        prefix
            .iter()
            .find_map(|p| text.strip_prefix(p))
            .and_then(|digits| u64::from_str_radix(digits, radix).ok())
            .map(|n| n as f64)
    };
    radix(&["0x", "0X"], 16)
        .or_else(|| radix(&["0o", "0O"], 8))
        .or_else(|| radix(&["0b", "0B"], 2))
        .or_else(|| text.parse::<f64>().ok())
}

/// Get the text of a tree-sitter node.
fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}
