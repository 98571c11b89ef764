//! Import management for the instrumentation entry point.
//!
//! A pre-pass over the top-level statements decides whether the entry
//! identifier is already bound and, if not, where and how to bind it.

use std::path::Path;

use tracewrap_ast::nodes::{has_child_kind, significant_children, string_value};
use tracewrap_ast::{Node, SourceTree, TextEdit};

use crate::config::{ImportStyle, InstrumentationConfig};

/// An existing top-level binding of the entry identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBinding {
    /// Module it is imported or required from, when statically known.
    pub module: Option<String>,
    /// Line of the binding statement (1-indexed).
    pub line: usize,
}

/// Find a top-level binding of `entry`.
///
/// Recognized forms:
/// - `import { entry } from 'm'`, `import { x as entry } from 'm'`
/// - `import entry from 'm'`
/// - `const { entry } = require('m')`, `const { x: entry } = require('m')`
/// - any other top-level `const`/`let`/`var` named `entry`
/// - a local `function entry` or `class entry`, exported or not
#[must_use]
pub fn find_entry_binding(tree: &SourceTree<'_>, entry: &str) -> Option<EntryBinding> {
    for stmt in significant_children(tree.root()) {
        if let Some(module) = statement_binds(tree, stmt, entry) {
            return Some(EntryBinding {
                module,
                line: tree.line_of(stmt.start_byte()),
            });
        }
    }
    None
}

/// `Some(module)` when `stmt` binds `entry`; the module is `None` for
/// local definitions.
fn statement_binds(tree: &SourceTree<'_>, stmt: Node<'_>, entry: &str) -> Option<Option<String>> {
    match stmt.kind() {
        "import_statement" => import_binds(tree, stmt, entry),
        "lexical_declaration" | "variable_declaration" => declaration_binds(tree, stmt, entry),
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration" => (tree.field_text(stmt, "name") == Some(entry)).then_some(None),
        "export_statement" => stmt
            .child_by_field_name("declaration")
            .and_then(|decl| statement_binds(tree, decl, entry)),
        _ => None,
    }
}

/// `Some(module)` when `stmt` imports `entry` as a value binding.
fn import_binds(tree: &SourceTree<'_>, stmt: Node<'_>, entry: &str) -> Option<Option<String>> {
    // `import type { ... }` binds nothing at runtime.
    if has_child_kind(stmt, "type") {
        return None;
    }
    let module = stmt
        .child_by_field_name("source")
        .and_then(|s| string_value(tree, s))
        .map(str::to_string);
    let clause = significant_children(stmt)
        .into_iter()
        .find(|n| n.kind() == "import_clause")?;

    for part in significant_children(clause) {
        match part.kind() {
            "identifier" if tree.text(part) == entry => return Some(module),
            "named_imports" => {
                for specifier in significant_children(part) {
                    if specifier.kind() != "import_specifier" || has_child_kind(specifier, "type") {
                        continue;
                    }
                    let local = specifier
                        .child_by_field_name("alias")
                        .or_else(|| specifier.child_by_field_name("name"));
                    if local.is_some_and(|n| tree.text(n) == entry) {
                        return Some(module);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// `Some(module)` when a declarator of `stmt` binds `entry`.
fn declaration_binds(tree: &SourceTree<'_>, stmt: Node<'_>, entry: &str) -> Option<Option<String>> {
    for declarator in significant_children(stmt) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(binding) = declarator.child_by_field_name("name") else {
            continue;
        };
        let binds = match binding.kind() {
            "identifier" => tree.text(binding) == entry,
            "object_pattern" => significant_children(binding).into_iter().any(|prop| {
                match prop.kind() {
                    "shorthand_property_identifier_pattern" => tree.text(prop) == entry,
                    "pair_pattern" => prop
                        .child_by_field_name("value")
                        .is_some_and(|v| tree.text(v) == entry),
                    _ => false,
                }
            }),
            _ => false,
        };
        if binds {
            let module = declarator
                .child_by_field_name("value")
                .and_then(|v| require_source(tree, v))
                .map(str::to_string);
            return Some(module);
        }
    }
    None
}

/// Module path of a `require('m')` call.
fn require_source<'s>(tree: &SourceTree<'s>, expr: Node<'_>) -> Option<&'s str> {
    if expr.kind() != "call_expression" {
        return None;
    }
    let callee = expr.child_by_field_name("function")?;
    if tree.text(callee) != "require" {
        return None;
    }
    let args = expr.child_by_field_name("arguments")?;
    let first = significant_children(args).into_iter().next()?;
    string_value(tree, first)
}

/// Resolve `Auto` to a concrete style for this file.
///
/// `.cjs`/`.cts` is CommonJS and `.mjs`/`.mts` is ESM. Otherwise a file with no
/// `import`/`export` statements that calls `require` or assigns
/// `module.exports`/`exports.*` at the top level is CommonJS.
#[must_use]
pub fn resolve_style(tree: &SourceTree<'_>, path: &Path, style: ImportStyle) -> ImportStyle {
    if style != ImportStyle::Auto {
        return style;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("cjs" | "cts") => return ImportStyle::CommonJs,
        Some("mjs" | "mts") => return ImportStyle::Esm,
        _ => {}
    }

    let mut uses_require = false;
    for stmt in significant_children(tree.root()) {
        match stmt.kind() {
            "import_statement" | "export_statement" => return ImportStyle::Esm,
            "lexical_declaration" | "variable_declaration" => {
                uses_require |= significant_children(stmt).into_iter().any(|d| {
                    d.child_by_field_name("value")
                        .is_some_and(|v| require_source(tree, v).is_some())
                });
            }
            "expression_statement" => {
                let text = tree.text(stmt);
                uses_require |= text.starts_with("module.exports") || text.starts_with("exports.");
            }
            _ => {}
        }
    }
    if uses_require {
        ImportStyle::CommonJs
    } else {
        ImportStyle::Esm
    }
}

/// Statement text binding the entry identifier.
#[must_use]
pub fn import_statement(config: &InstrumentationConfig, style: ImportStyle) -> String {
    let entry = &config.function_name;
    let module = &config.module_path;
    match style {
        ImportStyle::CommonJs => format!("const {{ {entry} }} = require('{module}');"),
        ImportStyle::Esm | ImportStyle::Auto => format!("import {{ {entry} }} from '{module}';"),
    }
}

/// Edit inserting `statement` at the top of the file.
///
/// The insertion goes after a hashbang and the directive prologue, and in
/// front of any comment block attached to the first statement. When the
/// first statement is not an import or `require` a blank line separates
/// them. Line breaks follow the file's own terminator.
#[must_use]
pub fn insertion_edit(tree: &SourceTree<'_>, statement: &str) -> TextEdit {
    let source = tree.source();
    let newline = tree.line_ending();
    let root = tree.root();
    let children: Vec<Node<'_>> = root.named_children(&mut root.walk()).collect();

    let first = children.iter().position(|n| {
        !matches!(n.kind(), "hash_bang_line" | "comment") && !is_directive(tree, *n)
    });
    let Some(first) = first else {
        // Only comments/directives: append after the last of them.
        let at = children.last().map_or(0, Node::end_byte);
        let prefix = if at == 0 { "" } else { newline };
        return TextEdit::insert(at, format!("{prefix}{statement}{newline}"));
    };

    let mut anchor = first;
    while anchor > 0 {
        let prev = children[anchor - 1];
        let next = children[anchor];
        let attached = prev.kind() == "comment"
            && next.start_position().row <= prev.end_position().row + 1;
        if !attached {
            break;
        }
        anchor -= 1;
    }

    let start = children[anchor].start_byte();
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let at = if source[line_start..start].trim().is_empty() {
        line_start
    } else {
        start
    };
    let separator = if is_import_like(tree, children[first]) {
        newline.to_string()
    } else {
        newline.repeat(2)
    };
    TextEdit::insert(at, format!("{statement}{separator}"))
}

/// An `import` statement or a declaration initialized by `require(...)`.
fn is_import_like(tree: &SourceTree<'_>, node: Node<'_>) -> bool {
    match node.kind() {
        "import_statement" => true,
        "lexical_declaration" | "variable_declaration" => significant_children(node)
            .into_iter()
            .any(|d| d.child_by_field_name("value").is_some_and(|v| require_source(tree, v).is_some())),
        _ => false,
    }
}

/// `'use strict';` and friends.
fn is_directive(tree: &SourceTree<'_>, node: Node<'_>) -> bool {
    node.kind() == "expression_statement"
        && significant_children(node)
            .first()
            .is_some_and(|expr| string_value(tree, *expr).is_some() && expr.kind() == "string")
}
