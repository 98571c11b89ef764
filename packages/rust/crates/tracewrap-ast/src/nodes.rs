//! Helpers for inspecting tree-sitter nodes of the TypeScript grammar.

use tree_sitter::Node;

use crate::tree::SourceTree;

/// Node kinds that evaluate to a function value.
///
/// `function` is the pre-0.21 grammar name of `function_expression`.
pub const FUNCTION_EXPRESSION_KINDS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

/// Check if a node has a direct child of the given kind.
///
/// Useful for keyword modifiers like `async`, `static`, `*`, `default`.
#[must_use]
pub fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    node.children(&mut node.walk())
        .any(|child| child.kind() == kind)
}

/// Named children of `node`, comments excluded.
#[must_use]
pub fn significant_children(node: Node<'_>) -> Vec<Node<'_>> {
    node.named_children(&mut node.walk())
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether `node` is an arrow, function or generator expression.
#[must_use]
pub fn is_function_expression(node: Node<'_>) -> bool {
    FUNCTION_EXPRESSION_KINDS.contains(&node.kind())
}

/// Unquoted contents of a plain string literal.
///
/// Template strings count only when they hold no substitutions.
#[must_use]
pub fn string_value<'s>(tree: &SourceTree<'s>, node: Node<'_>) -> Option<&'s str> {
    let is_plain = match node.kind() {
        "string" => true,
        "template_string" => !has_child_kind(node, "template_substitution"),
        _ => false,
    };
    if !is_plain {
        return None;
    }
    let text = tree.text(node);
    (text.len() >= 2).then(|| &text[1..text.len() - 1])
}
