//! Eligibility classification.
//!
//! Walks the top-level statements of a parsed file, then the members of
//! every class and object literal found there, and gives each visited node
//! exactly one outcome: candidate or skip record.

use std::collections::HashSet;
use std::ops::Range;

use tracewrap_ast::nodes::{
    has_child_kind, is_function_expression, significant_children, string_value,
};
use tracewrap_ast::{Node, SourceTree};

use crate::config::SkipMatcher;
use crate::types::{ExportKind, FunctionNode, NodeKind, SkipReason, SkipRecord};

/// Outcome of classifying one file, in traversal order.
#[derive(Debug, Default)]
pub struct Classification {
    /// Nodes to wrap.
    pub candidates: Vec<FunctionNode>,
    /// Nodes left alone, with the reason.
    pub skipped: Vec<SkipRecord>,
}

/// Classify every function-like node of `tree`.
///
/// `entry` is the instrumentation identifier. Calls to it mark code that is
/// already wrapped, and a top-level declaration of it is never wrapped.
#[must_use]
pub fn classify(tree: &SourceTree<'_>, skip: &SkipMatcher, entry: &str) -> Classification {
    let walker = Walker { tree, entry };
    let mut visited = Vec::new();
    let mut containers = Vec::new();

    for stmt in significant_children(tree.root()) {
        walker.visit_statement(stmt, &mut visited, &mut containers);
    }
    for container in &containers {
        walker.visit_members(container, &mut visited);
    }
    mark_overloaded(&mut visited);

    let mut out = Classification::default();
    for item in visited {
        match decide(&item, skip, entry) {
            Some(reason) => {
                let identifier = item.node.identifier();
                tracing::debug!(
                    identifier = identifier.as_deref().unwrap_or("<anonymous>"),
                    line = item.node.line,
                    %reason,
                    "skipping"
                );
                out.skipped.push(SkipRecord::new(&item.node, reason));
            }
            None => out.candidates.push(item.node),
        }
    }
    out
}

/// A visited node plus the facts `decide` needs beyond the node itself.
struct Visited {
    node: FunctionNode,
    wrapped: bool,
    /// Body block of a function declaration and whether it is already the
    /// traced closure form.
    body: Option<(Range<usize>, bool)>,
}

/// Retarget top-level implementations that follow overload signatures.
///
/// The declaration must stay a declaration to keep its signatures, so the
/// edit moves to the body block, as for methods.
fn mark_overloaded(visited: &mut [Visited]) {
    let signatures: HashSet<String> = visited
        .iter()
        .filter(|v| v.node.kind == NodeKind::OverloadSignature && v.node.enclosing.is_none())
        .filter_map(|v| v.node.name.clone())
        .collect();
    if signatures.is_empty() {
        return;
    }
    for item in visited.iter_mut() {
        let is_declaration = matches!(
            item.node.kind,
            NodeKind::FunctionDeclaration
                | NodeKind::ExportedFunctionDeclaration
                | NodeKind::DefaultExportedFunctionDeclaration
        );
        let named = item.node.name.as_ref().is_some_and(|n| signatures.contains(n));
        if !is_declaration || !named {
            continue;
        }
        if let Some((span, wrapped)) = item.body.clone() {
            item.node.overloaded = true;
            item.node.span = span;
            item.wrapped = wrapped;
        }
    }
}

/// A class body or object literal whose methods are visited after the
/// top-level pass.
struct Container<'t> {
    name: Option<String>,
    body: Node<'t>,
    is_class: bool,
}

/// Apply the skip rules in order. `None` means candidate.
fn decide(item: &Visited, skip: &SkipMatcher, entry: &str) -> Option<SkipReason> {
    let node = &item.node;
    if node.kind == NodeKind::ConstructorMethod {
        return Some(SkipReason::Constructor);
    }
    if node.kind == NodeKind::OverloadSignature {
        return Some(SkipReason::OverloadSignature);
    }
    let Some(identifier) = node.identifier() else {
        return Some(SkipReason::AnonymousDefaultExport);
    };
    let bare_match = node.kind.is_member() && node.name.as_deref().is_some_and(|n| skip.is_match(n));
    // A local definition of the entry point stays as is.
    let is_entry = !node.kind.is_member() && identifier == entry;
    if skip.is_match(&identifier) || bare_match || is_entry {
        return Some(SkipReason::NameMatch);
    }
    if item.wrapped {
        return Some(SkipReason::AlreadyWrapped);
    }
    if node.is_generator && (node.kind.is_member() || node.overloaded) {
        return Some(SkipReason::Generator);
    }
    None
}

struct Walker<'a, 's> {
    tree: &'a SourceTree<'s>,
    entry: &'a str,
}

impl<'a, 's> Walker<'a, 's> {
    fn visit_statement(
        &self,
        stmt: Node<'a>,
        visited: &mut Vec<Visited>,
        containers: &mut Vec<Container<'a>>,
    ) {
        match stmt.kind() {
            "function_declaration" | "generator_function_declaration" => {
                visited.push(self.function(stmt, ExportKind::None, stmt.byte_range()));
            }
            "function_signature" => {
                visited.push(self.overload(stmt, None, ExportKind::None));
            }
            "lexical_declaration" => {
                self.visit_lexical(stmt, ExportKind::None, visited, containers);
            }
            "class_declaration" | "abstract_class_declaration" => {
                containers.push(self.class_container(stmt, None));
            }
            "export_statement" => self.visit_export(stmt, visited, containers),
            _ => {}
        }
    }

    fn visit_export(
        &self,
        stmt: Node<'a>,
        visited: &mut Vec<Visited>,
        containers: &mut Vec<Container<'a>>,
    ) {
        let is_default = has_child_kind(stmt, "default");
        let export = if is_default {
            ExportKind::Default
        } else {
            ExportKind::Named
        };

        if let Some(decl) = stmt.child_by_field_name("declaration") {
            match decl.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    // A default export is rewritten as a whole statement; a
                    // named one keeps its `export` keyword around the new const.
                    let span = if is_default {
                        stmt.byte_range()
                    } else {
                        decl.byte_range()
                    };
                    visited.push(self.function(decl, export, span));
                }
                "function_signature" => visited.push(self.overload(decl, None, export)),
                "lexical_declaration" => self.visit_lexical(decl, export, visited, containers),
                "class_declaration" | "abstract_class_declaration" => {
                    containers.push(self.class_container(decl, None));
                }
                _ => {}
            }
            return;
        }

        if !is_default {
            return;
        }
        let Some(value) = stmt.child_by_field_name("value") else {
            return;
        };
        match value.kind() {
            _ if is_function_expression(value) => {
                visited.push(self.function(value, ExportKind::Default, stmt.byte_range()));
            }
            "class" => containers.push(self.class_container(value, None)),
            "object" => containers.push(Container {
                name: None,
                body: value,
                is_class: false,
            }),
            _ => {}
        }
    }

    fn visit_lexical(
        &self,
        decl: Node<'a>,
        export: ExportKind,
        visited: &mut Vec<Visited>,
        containers: &mut Vec<Container<'a>>,
    ) {
        if !has_child_kind(decl, "const") {
            return;
        }

        for declarator in significant_children(decl) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(binding) = declarator.child_by_field_name("name") else {
                continue;
            };
            // Destructuring patterns have no single name to bind.
            if binding.kind() != "identifier" {
                continue;
            }
            let Some(value) = declarator.child_by_field_name("value") else {
                continue;
            };
            let name = self.tree.text(binding).to_string();

            if is_function_expression(value) {
                visited.push(self.const_binding(name, value, value.byte_range(), export, false));
            } else if let Some(inner) = self.wrapped_function(value) {
                visited.push(self.const_binding(name, inner, value.byte_range(), export, true));
            } else if value.kind() == "class" {
                containers.push(self.class_container(value, Some(name)));
            } else if value.kind() == "object" {
                containers.push(Container {
                    name: Some(name),
                    body: value,
                    is_class: false,
                });
            }
        }
    }

    fn visit_members(&self, container: &Container<'a>, visited: &mut Vec<Visited>) {
        for member in significant_children(container.body) {
            match member.kind() {
                "method_definition" => {
                    // Accessors are properties, not methods.
                    if has_child_kind(member, "get") || has_child_kind(member, "set") {
                        continue;
                    }
                    visited.push(self.method(member, container));
                }
                "method_signature" if container.is_class => {
                    visited.push(self.overload(member, container.name.clone(), ExportKind::None));
                }
                _ => {}
            }
        }
    }

    /// Function declaration, or function value of `export default`.
    fn function(&self, func: Node<'a>, export: ExportKind, span: Range<usize>) -> Visited {
        let body = func
            .child_by_field_name("body")
            .filter(|b| b.kind() == "statement_block")
            .map(|b| (b.byte_range(), self.body_is_wrapped(b)));
        let kind = match export {
            ExportKind::None => NodeKind::FunctionDeclaration,
            ExportKind::Named => NodeKind::ExportedFunctionDeclaration,
            ExportKind::Default => NodeKind::DefaultExportedFunctionDeclaration,
        };
        Visited {
            node: FunctionNode {
                kind,
                name: self.tree.field_text(func, "name").map(str::to_string),
                enclosing: None,
                export,
                is_async: has_child_kind(func, "async"),
                is_generator: is_generator(func),
                overloaded: false,
                params: self.params(func),
                body: self.tree.field_text(func, "body").unwrap_or_default().to_string(),
                text: self.tree.text(func).to_string(),
                line: self.tree.line_of(func.start_byte()),
                indent: self.tree.indent_at(span.start).to_string(),
                span,
            },
            wrapped: false,
            body,
        }
    }

    fn const_binding(
        &self,
        name: String,
        func: Node<'a>,
        span: Range<usize>,
        export: ExportKind,
        wrapped: bool,
    ) -> Visited {
        Visited {
            node: FunctionNode {
                kind: NodeKind::ConstArrowOrFunctionExpression,
                name: Some(name),
                enclosing: None,
                export,
                is_async: has_child_kind(func, "async"),
                is_generator: is_generator(func),
                overloaded: false,
                params: self.params(func),
                body: self.tree.field_text(func, "body").unwrap_or_default().to_string(),
                text: self.tree.text(func).to_string(),
                line: self.tree.line_of(func.start_byte()),
                indent: self.tree.indent_at(span.start).to_string(),
                span,
            },
            wrapped,
            body: None,
        }
    }

    fn overload(&self, sig: Node<'a>, enclosing: Option<String>, export: ExportKind) -> Visited {
        Visited {
            node: FunctionNode {
                kind: NodeKind::OverloadSignature,
                name: self.tree.field_text(sig, "name").map(str::to_string),
                enclosing,
                export,
                is_async: has_child_kind(sig, "async"),
                is_generator: false,
                overloaded: false,
                params: self.params(sig),
                body: String::new(),
                text: self.tree.text(sig).to_string(),
                span: sig.byte_range(),
                line: self.tree.line_of(sig.start_byte()),
                indent: self.tree.indent_at(sig.start_byte()).to_string(),
            },
            wrapped: false,
            body: None,
        }
    }

    fn method(&self, member: Node<'a>, container: &Container<'a>) -> Visited {
        let name = self.member_name(member);
        let kind = if !container.is_class {
            NodeKind::ObjectLiteralMethod
        } else if name.as_deref() == Some("constructor") {
            NodeKind::ConstructorMethod
        } else if has_child_kind(member, "static") {
            NodeKind::ClassStaticMethod
        } else {
            NodeKind::ClassInstanceMethod
        };

        let body = member.child_by_field_name("body");
        let wrapped = body.is_some_and(|b| self.body_is_wrapped(b));
        Visited {
            node: FunctionNode {
                kind,
                name,
                enclosing: container.name.clone(),
                export: ExportKind::None,
                is_async: has_child_kind(member, "async"),
                is_generator: has_child_kind(member, "*"),
                overloaded: false,
                params: self.params(member),
                body: body.map(|b| self.tree.text(b)).unwrap_or_default().to_string(),
                text: self.tree.text(member).to_string(),
                span: body.map_or_else(|| member.byte_range(), |b| b.byte_range()),
                line: self.tree.line_of(member.start_byte()),
                indent: self.tree.indent_at(member.start_byte()).to_string(),
            },
            wrapped,
            body: None,
        }
    }

    /// Method key as written: string keys are unquoted and computed keys
    /// lose their brackets (`['a-b']` gives `a-b`, `[key]` gives `key`).
    fn member_name(&self, member: Node<'a>) -> Option<String> {
        let key = member.child_by_field_name("name")?;
        let key = match key.kind() {
            "computed_property_name" => significant_children(key).into_iter().next()?,
            _ => key,
        };
        let name = string_value(self.tree, key).unwrap_or_else(|| self.tree.text(key));
        Some(name.to_string())
    }

    fn class_container(&self, class: Node<'a>, binding: Option<String>) -> Container<'a> {
        let own_name = self.tree.field_text(class, "name").map(str::to_string);
        Container {
            name: binding.or(own_name),
            body: class.child_by_field_name("body").unwrap_or(class),
            is_class: true,
        }
    }

    /// Parameter list text; a bare arrow parameter (`x => x`) has no parens.
    fn params(&self, func: Node<'a>) -> String {
        self.tree
            .field_text(func, "parameters")
            .or_else(|| self.tree.field_text(func, "parameter"))
            .unwrap_or_default()
            .to_string()
    }

    /// If `expr` is `entry(..., fn)`, return `fn`.
    ///
    /// Structural: callee identity and trailing argument position, so any
    /// formatting of the call still matches.
    fn wrapped_function(&self, expr: Node<'a>) -> Option<Node<'a>> {
        if expr.kind() != "call_expression" {
            return None;
        }
        let callee = expr.child_by_field_name("function")?;
        if callee.kind() != "identifier" || self.tree.text(callee) != self.entry {
            return None;
        }
        let args = expr.child_by_field_name("arguments")?;
        significant_children(args)
            .into_iter()
            .last()
            .filter(|arg| is_function_expression(*arg))
    }

    /// Whether a method body is exactly `return entry(..., () => {...})();`.
    fn body_is_wrapped(&self, body: Node<'a>) -> bool {
        let statements = significant_children(body);
        let [stmt] = statements.as_slice() else {
            return false;
        };
        if stmt.kind() != "return_statement" {
            return false;
        }
        let Some(call) = significant_children(*stmt).into_iter().next() else {
            return false;
        };
        call.kind() == "call_expression"
            && call
                .child_by_field_name("function")
                .and_then(|inner| self.wrapped_function(inner))
                .is_some()
    }
}

fn is_generator(func: Node<'_>) -> bool {
    func.kind().starts_with("generator_") || has_child_kind(func, "*")
}
