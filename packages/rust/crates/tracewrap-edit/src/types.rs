//! Core types for the wrapping pipeline.
//!
//! Defines the data structures passed between the classifier, the name
//! resolver, the rewriter and the orchestrator.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Syntactic shape of a function-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// `function f() {}`
    FunctionDeclaration,
    /// `export function f() {}`
    ExportedFunctionDeclaration,
    /// `export default function f() {}` (or the anonymous form)
    DefaultExportedFunctionDeclaration,
    /// `const f = () => {}` / `const f = function () {}`
    ConstArrowOrFunctionExpression,
    /// Non-static class method
    ClassInstanceMethod,
    /// `static` class method
    ClassStaticMethod,
    /// Shorthand method inside an object literal
    ObjectLiteralMethod,
    /// Class `constructor`
    ConstructorMethod,
    /// Bodiless overload declaration
    OverloadSignature,
}

impl NodeKind {
    /// Whether the node lives inside a class or object literal.
    #[must_use]
    pub fn is_member(self) -> bool {
        matches!(
            self,
            Self::ClassInstanceMethod
                | Self::ClassStaticMethod
                | Self::ObjectLiteralMethod
                | Self::ConstructorMethod
        )
    }
}

/// How a declaration is exported from its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// Not exported.
    #[default]
    None,
    /// `export ...`
    Named,
    /// `export default ...`
    Default,
}

/// A function-like node found by the classifier.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionNode {
    /// Syntactic shape.
    pub kind: NodeKind,
    /// Declared name, binding name, or method name. `None` when anonymous.
    pub name: Option<String>,
    /// Enclosing class or object binding, for members.
    pub enclosing: Option<String>,
    /// Export visibility.
    pub export: ExportKind,
    /// Declared `async`.
    pub is_async: bool,
    /// Declared as a generator (`function*`, `*method()`).
    pub is_generator: bool,
    /// Implementation that follows overload signatures. Only its body is
    /// wrapped so the signatures keep their declaration.
    pub overloaded: bool,
    /// Parameter list text, parentheses included.
    pub params: String,
    /// Body text (block or expression). Empty for overload signatures.
    pub body: String,
    /// Source text of the function itself.
    pub text: String,
    /// Byte range replaced when this node is wrapped.
    pub span: Range<usize>,
    /// Line of the declaration (1-indexed).
    pub line: usize,
    /// Leading whitespace of the declaration's line.
    #[serde(skip)]
    pub indent: String,
}

impl FunctionNode {
    /// Identifier used for skip matching and default span names.
    ///
    /// Members are qualified as `Enclosing.method`; a member of an anonymous
    /// container has no identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        if self.kind.is_member() {
            match (&self.enclosing, &self.name) {
                (Some(owner), Some(name)) => Some(format!("{owner}.{name}")),
                _ => None,
            }
        } else {
            self.name.clone()
        }
    }
}

/// Why a visited node was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Class constructors are never wrapped.
    Constructor,
    /// `export default function () {}` has no name to bind.
    AnonymousDefaultExport,
    /// Identifier matched a configured skip pattern.
    NameMatch,
    /// Already the argument of the instrumentation call.
    AlreadyWrapped,
    /// Bodiless overload declaration.
    OverloadSignature,
    /// Generator whose body would move into a closure that cannot `yield`.
    Generator,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructor => "constructor",
            Self::AnonymousDefaultExport => "anonymousDefaultExport",
            Self::NameMatch => "nameMatch",
            Self::AlreadyWrapped => "alreadyWrapped",
            Self::OverloadSignature => "overloadSignature",
            Self::Generator => "generator",
        };
        f.write_str(s)
    }
}

/// A node the engine decided not to wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    /// Shape of the skipped node.
    pub kind: NodeKind,
    /// Its identifier, when it has one.
    pub identifier: Option<String>,
    /// Line of the declaration (1-indexed).
    pub line: usize,
    /// Reason for skipping.
    pub reason: SkipReason,
}

impl SkipRecord {
    /// Record `node` as skipped for `reason`.
    #[must_use]
    pub fn new(node: &FunctionNode, reason: SkipReason) -> Self {
        Self {
            kind: node.kind,
            identifier: node.identifier(),
            line: node.line,
            reason,
        }
    }
}

/// A node that will be wrapped, with its span name and replacement text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTarget {
    /// The eligible node.
    pub node: FunctionNode,
    /// Literal span name passed to the instrumentation call.
    pub span_name: String,
    /// Text substituted for `node.span`.
    pub replacement: String,
}

/// Result of transforming one source file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Whether `modified` differs from the input.
    pub changed: bool,
    /// Number of wrapped nodes.
    pub wrapped_count: usize,
    /// Every skipped node with its reason, in traversal order.
    pub skipped: Vec<SkipRecord>,
    /// Output text. Byte-identical to the input when `changed` is false.
    pub modified: String,
    /// Wrapped nodes in traversal order.
    pub wrapped: Vec<CandidateTarget>,
}

impl TransformResult {
    /// A no-op result that hands `source` back untouched.
    #[must_use]
    pub fn unchanged(source: &str, skipped: Vec<SkipRecord>) -> Self {
        Self {
            changed: false,
            wrapped_count: 0,
            skipped,
            modified: source.to_string(),
            wrapped: Vec::new(),
        }
    }

    /// Skip records with the given reason.
    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &SkipRecord> {
        self.skipped.iter().filter(move |s| s.reason == reason)
    }

    /// Span names of the wrapped nodes.
    #[must_use]
    pub fn span_names(&self) -> Vec<&str> {
        self.wrapped.iter().map(|c| c.span_name.as_str()).collect()
    }
}
