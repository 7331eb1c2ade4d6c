use super::{NodeKind, SyntaxNode};

/// Find every node of `kind` beneath `root` that satisfies `predicate`.
///
/// Traversal is pre-order in document order. `root` sits at depth 0 and is
/// only a candidate when `include_root` is set; nodes deeper than
/// `depth_limit` are never visited, which bounds the work on adversarially
/// nested literals.
pub fn find_node_by_type<'a, F>(
    root: &'a SyntaxNode,
    kind: NodeKind,
    depth_limit: usize,
    include_root: bool,
    predicate: F,
) -> Vec<&'a SyntaxNode>
where
    F: Fn(&SyntaxNode) -> bool,
{
    let mut matches = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let candidate = depth > 0 || include_root;
        if candidate && node.kind() == kind && predicate(node) {
            matches.push(node);
        }

        if depth < depth_limit {
            stack.extend(
                node.children()
                    .into_iter()
                    .rev()
                    .map(|child| (child, depth + 1)),
            );
        }
    }

    matches
}
