//! Wrapper rewriting.
//!
//! Turns a candidate node and its span name into the text that replaces
//! `node.span`. Pure string work; the orchestrator applies the result.

use crate::naming::quote_literal;
use crate::types::{FunctionNode, NodeKind};

/// Indentation step used when a body gives no better hint.
const DEFAULT_INDENT_STEP: &str = "  ";

/// Build the replacement for `node`.
///
/// `entry` is the instrumentation identifier; `span_name` is quoted as the
/// first argument of the call. `newline` is the file's line terminator.
/// Constructors and overload signatures are never wrapped and come back
/// unchanged. An overloaded implementation keeps its declaration and only
/// its body is wrapped, as for methods.
///
/// # Example
///
/// ```rust,ignore
/// // function createUser(data) { return data; }
/// let text = rewrite(&node, "createUser", "traceCall", "\n");
/// assert_eq!(
///     text,
///     "const createUser = traceCall('createUser', function createUser(data) { return data; });"
/// );
/// ```
#[must_use]
pub fn rewrite(node: &FunctionNode, span_name: &str, entry: &str, newline: &str) -> String {
    let literal = quote_literal(span_name);
    let name = node.name.as_deref().unwrap_or_default();

    match node.kind {
        _ if node.overloaded => wrap_body(node, &literal, entry, newline),
        NodeKind::FunctionDeclaration | NodeKind::ExportedFunctionDeclaration => {
            format!("const {name} = {entry}({literal}, {});", node.text)
        }
        NodeKind::DefaultExportedFunctionDeclaration => format!(
            "const {name} = {entry}({literal}, {});{newline}{}export default {name};",
            node.text, node.indent
        ),
        NodeKind::ConstArrowOrFunctionExpression => {
            format!("{entry}({literal}, {})", node.text)
        }
        NodeKind::ClassInstanceMethod
        | NodeKind::ClassStaticMethod
        | NodeKind::ObjectLiteralMethod => wrap_body(node, &literal, entry, newline),
        NodeKind::ConstructorMethod | NodeKind::OverloadSignature => node.text.clone(),
    }
}

/// Replace a body block with an immediately invoked traced arrow.
///
/// The arrow keeps the function's `this`, `arguments` and `super`; the
/// function keeps its own signature and modifiers.
fn wrap_body(node: &FunctionNode, literal: &str, entry: &str, newline: &str) -> String {
    let indent = node.indent.as_str();
    let step = indent_step(&node.body, indent);
    let asyncness = if node.is_async { "async " } else { "" };
    // Re-indenting would alter multi-line template literals.
    let body = if node.body.contains('`') {
        node.body.clone()
    } else {
        reindent(&node.body, &step)
    };

    format!(
        "{{{newline}{indent}{step}return {entry}({literal}, {asyncness}() => {body})();{newline}{indent}}}"
    )
}

/// Guess one indentation level from the first indented body line.
fn indent_step(body: &str, indent: &str) -> String {
    body.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .find_map(|line| {
            let extra = line.strip_prefix(indent)?;
            let width = extra.len() - extra.trim_start().len();
            (width > 0).then(|| extra[..width].to_string())
        })
        .unwrap_or_else(|| DEFAULT_INDENT_STEP.to_string())
}

/// Indent every line after the first by `step`; blank lines stay blank.
/// A `\r` before each `\n` stays at the end of its line.
fn reindent(body: &str, step: &str) -> String {
    let mut out = String::with_capacity(body.len() + body.lines().count() * step.len());
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(step);
            }
        }
        out.push_str(line);
    }
    out
}
