#![allow(clippy::doc_markdown)]

//! tracewrap-edit - Instrumentation wrapping for TypeScript and JavaScript
//!
//! Rewrites function-like declarations so their logic runs inside an
//! instrumentation call (`traceCall('name', fn)` by default), adds the one
//! import that call needs, and leaves everything else byte-for-byte intact.
//!
//! # Features
//!
//! - **Classification**: every function, const-bound function, method,
//!   constructor and overload gets exactly one outcome, candidate or skip
//! - **Idempotence**: already-wrapped code is recognized structurally
//! - **Span names**: `{name}`/`{file}` templates, escaped string literals
//! - **Import management**: ESM or CommonJS, never duplicated
//! - **Batch mode**: parallel, `.gitignore`-aware directory processing
//!
//! # Architecture
//!
//! ```text
//! tracewrap-edit/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # EditError enum (thiserror)
//! ├── types.rs      # NodeKind, FunctionNode, SkipReason, TransformResult
//! ├── config.rs     # WrapConfig (TOML) and SkipMatcher
//! ├── classify.rs   # Eligibility classifier
//! ├── naming.rs     # Span-name resolution and quoting
//! ├── rewrite.rs    # Wrapper rewriter
//! ├── imports.rs    # Entry-point import detection and insertion
//! ├── transform.rs  # Transformer (orchestrator)
//! ├── source_io.rs  # Safe file reading
//! ├── diff.rs       # Diff generation utilities
//! └── batch.rs      # Parallel directory processing
//! ```
//!
//! # Example
//!
//! ```rust
//! use tracewrap_edit::{SkipReason, WrapConfig, transform_file};
//!
//! let config = WrapConfig {
//!     skip: vec!["^_".to_string()],
//!     ..WrapConfig::default()
//! };
//! let result = transform_file("function _internal() {}\n", "util.ts", &config).unwrap();
//! assert!(!result.changed);
//! assert_eq!(result.skipped[0].reason, SkipReason::NameMatch);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod batch;
mod classify;
mod config;
mod diff;
mod error;
mod imports;
mod naming;
mod rewrite;
mod source_io;
mod transform;
mod types;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use classify::{Classification, classify};
pub use config::{
    DEFAULT_FUNCTION_NAME, DEFAULT_MODULE_PATH, ImportStyle, InstrumentationConfig, SkipMatcher,
    WrapConfig,
};
pub use error::EditError;
pub use imports::{EntryBinding, find_entry_binding};
pub use naming::{quote_literal, resolve_name};
pub use rewrite::rewrite;
pub use source_io::{DEFAULT_MAX_FILE_SIZE, read_source};
pub use transform::{PathTransform, Transformer, transform_file};
pub use types::{
    CandidateTarget, ExportKind, FunctionNode, NodeKind, SkipReason, SkipRecord, TransformResult,
};

// Batch processing exports
pub use batch::{BatchConfig, BatchStats};

// Re-export diff utilities for external use
pub use diff::{file_diff, generate_unified_diff};
