//! tracewrap-ast - Syntax provider for TypeScript and JavaScript
//!
//! Parses source text with tree-sitter, hands out navigable nodes whose
//! text is always the exact source slice, and applies batches of text edits
//! in a single consistent pass.
//!
//! ## Architecture
//!
//! ```text
//! tracewrap-ast/src/
//! ├── lib.rs      # Re-exports (entry point)
//! ├── error.rs    # ParseError, SyntaxError
//! ├── lang.rs     # Lang enum and grammar selection
//! ├── tree.rs     # SourceTree (parse + text/position queries)
//! ├── nodes.rs    # Node inspection helpers
//! └── edit.rs     # TextEdit and apply_edits
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use tracewrap_ast::{apply_edits, Lang, SourceTree, TextEdit};
//!
//! let source = "function hello() {}";
//! let tree = SourceTree::parse(source, Lang::TypeScript).unwrap();
//! let func = tree.root().named_child(0).unwrap();
//! let name = tree.field_text(func, "name").unwrap();
//! assert_eq!(name, "hello");
//!
//! let out = apply_edits(source, &[TextEdit::insert(0, "// hi\n")]).unwrap();
//! assert!(out.starts_with("// hi"));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod edit;
mod error;
mod lang;
pub mod nodes;
mod tree;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use edit::{TextEdit, apply_edits};
pub use error::{ParseError, SyntaxError};
pub use lang::Lang;
pub use tree::SourceTree;

// Tree-sitter node type, so callers don't need their own dependency.
pub use tree_sitter::Node;
