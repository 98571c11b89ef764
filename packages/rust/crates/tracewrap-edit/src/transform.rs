//! Transformation orchestrator.
//!
//! Parse, classify, resolve names, rewrite, make sure the entry point is
//! imported, then apply every edit in one pass.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracewrap_ast::{Lang, SourceTree, TextEdit, apply_edits};

use crate::classify::classify;
use crate::config::{SkipMatcher, WrapConfig};
use crate::diff::file_diff;
use crate::error::EditError;
use crate::imports::{find_entry_binding, import_statement, insertion_edit, resolve_style};
use crate::naming::resolve_name;
use crate::rewrite::rewrite;
use crate::source_io::{DEFAULT_MAX_FILE_SIZE, read_source};
use crate::types::{CandidateTarget, TransformResult};

/// Wrapping engine bound to one validated configuration.
///
/// Cheap to share across threads; the batch layer hands one instance to
/// every worker.
///
/// # Example
///
/// ```rust
/// use tracewrap_edit::{Transformer, WrapConfig};
///
/// let transformer = Transformer::new(WrapConfig::default()).unwrap();
/// let result = transformer
///     .transform_file("function createUser(data) { return data; }\n", "users.ts")
///     .unwrap();
/// assert!(result.changed);
/// assert!(result.modified.contains("traceCall('createUser', function createUser(data)"));
/// ```
#[derive(Debug, Clone)]
pub struct Transformer {
    config: WrapConfig,
    skip: SkipMatcher,
    max_file_size: u64,
}

/// Outcome of transforming a file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct PathTransform {
    /// Path as given by the caller.
    pub path: String,
    /// In-memory transformation result.
    pub result: TransformResult,
    /// Unified diff of the change; empty when unchanged.
    pub diff: String,
    /// Whether the file was rewritten on disk.
    pub written: bool,
}

impl Transformer {
    /// Validate `config` and compile its skip patterns.
    ///
    /// # Errors
    /// `EditError::Pattern` for a bad skip regex or entry identifier,
    /// `EditError::Config` for a bad module path.
    pub fn new(config: WrapConfig) -> Result<Self, EditError> {
        config.validate()?;
        let skip = SkipMatcher::new(&config.skip)?;
        Ok(Self {
            config,
            skip,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        })
    }

    /// Override the per-file size limit used by `transform_path`.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// The configuration this engine was built from.
    #[must_use]
    pub fn config(&self) -> &WrapConfig {
        &self.config
    }

    /// Per-file size limit.
    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Transform one source text. `path` selects the grammar and feeds the
    /// `{file}` token; nothing is read from disk.
    ///
    /// When no node qualifies the source comes back byte-identical and no
    /// import is added.
    ///
    /// # Errors
    /// `EditError::UnsupportedLanguage` for an unknown extension,
    /// `EditError::Parse` for malformed input, `EditError::Replacement` if
    /// the computed edits overlap.
    pub fn transform_file(&self, source: &str, path: &str) -> Result<TransformResult, EditError> {
        let lang = Lang::from_path(Path::new(path))
            .ok_or_else(|| EditError::UnsupportedLanguage(path.to_string()))?;
        let tree = SourceTree::parse(source, lang)?;

        let entry = self.config.instrumentation.function_name.as_str();
        let classification = classify(&tree, &self.skip, entry);
        if classification.candidates.is_empty() {
            tracing::debug!(path, skipped = classification.skipped.len(), "nothing to wrap");
            return Ok(TransformResult::unchanged(source, classification.skipped));
        }

        let pattern = self.config.name_pattern.as_deref();
        let newline = tree.line_ending();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut wrapped = Vec::with_capacity(classification.candidates.len());
        let mut edits = Vec::with_capacity(classification.candidates.len() + 1);

        for node in classification.candidates {
            // Candidates always carry an identifier.
            let identifier = node.identifier().unwrap_or_default();
            let span_name = resolve_name(&identifier, path, pattern);
            let replacement = rewrite(&node, &span_name, entry, newline);

            let count = seen.entry(span_name.clone()).or_default();
            *count += 1;
            if *count > 1 {
                tracing::debug!(path, span_name = %span_name, line = node.line, "duplicate span name");
            }
            tracing::debug!(path, %identifier, span_name = %span_name, line = node.line, "wrapping");

            edits.push(TextEdit::replace(node.span.clone(), replacement.clone()));
            wrapped.push(CandidateTarget {
                node,
                span_name,
                replacement,
            });
        }

        if let Some(edit) = self.import_edit(&tree, path) {
            edits.push(edit);
        }

        let modified = apply_edits(source, &edits)?;
        Ok(TransformResult {
            changed: modified != source,
            wrapped_count: wrapped.len(),
            skipped: classification.skipped,
            modified,
            wrapped,
        })
    }

    /// Insertion edit for the entry binding, or `None` when already bound.
    fn import_edit(&self, tree: &SourceTree<'_>, path: &str) -> Option<TextEdit> {
        let instrumentation = &self.config.instrumentation;
        let entry = instrumentation.function_name.as_str();

        if let Some(binding) = find_entry_binding(tree, entry) {
            match binding.module.as_deref() {
                Some(module) if module != instrumentation.module_path => tracing::warn!(
                    path,
                    entry,
                    module,
                    expected = %instrumentation.module_path,
                    line = binding.line,
                    "entry point is imported from a different module; keeping it"
                ),
                _ => tracing::debug!(path, entry, line = binding.line, "entry point already bound"),
            }
            return None;
        }

        let style = resolve_style(tree, Path::new(path), instrumentation.import_style);
        let statement = import_statement(instrumentation, style);
        Some(insertion_edit(tree, &statement))
    }

    /// Transform a file on disk.
    ///
    /// The file is rewritten only when it changed and `preview_only` is
    /// false.
    ///
    /// # Errors
    /// File-layer errors from `read_source`, any `transform_file` error, or
    /// `EditError::Io` when writing back fails.
    pub fn transform_path<P: AsRef<Path>>(
        &self,
        path: P,
        preview_only: bool,
    ) -> Result<PathTransform, EditError> {
        let path = path.as_ref();
        let shown = path.to_string_lossy().to_string();
        let source = read_source(path, self.max_file_size)?;
        let result = self.transform_file(&source, &shown)?;
        let diff = file_diff(&shown, &source, &result.modified);

        let written = result.changed && !preview_only;
        if written {
            std::fs::write(path, &result.modified)?;
            tracing::debug!(path = %shown, wrapped = result.wrapped_count, "written");
        }

        Ok(PathTransform {
            path: shown,
            result,
            diff,
            written,
        })
    }
}

/// One-shot form of [`Transformer::transform_file`].
///
/// # Errors
/// Configuration errors from [`Transformer::new`] plus everything
/// `transform_file` reports.
pub fn transform_file(
    source: &str,
    path: &str,
    config: &WrapConfig,
) -> Result<TransformResult, EditError> {
    Transformer::new(config.clone())?.transform_file(source, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, path: &str) -> TransformResult {
        transform_file(source, path, &WrapConfig::default()).expect("Should transform")
    }

    #[test]
    fn test_unsupported_extension() {
        let err = transform_file("x", "style.css", &WrapConfig::default()).expect_err("Should fail");
        assert!(matches!(err, EditError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_nothing_to_wrap_is_byte_identical() {
        let source = "// just data\nexport const n = 1;\n";
        let result = run(source, "a.ts");
        assert!(!result.changed);
        assert_eq!(result.modified, source);
    }

    #[test]
    fn test_import_inserted_once_for_many_wraps() {
        let source = "function a() {}\nfunction b() {}\n";
        let result = run(source, "a.ts");
        assert_eq!(result.wrapped_count, 2);
        assert_eq!(result.modified.matches("from 'autotel'").count(), 1);
    }

    #[test]
    fn test_foreign_import_kept() {
        let source = "import { traceCall } from './tracing';\nfunction a() {}\n";
        let result = run(source, "a.ts");
        assert!(result.changed);
        assert!(!result.modified.contains("autotel"));
    }

    #[test]
    fn test_duplicate_span_names_allowed() {
        let source = "const o = { run() {} };\nconst p = { run() {} };\n";
        let config = WrapConfig {
            name_pattern: Some("{file}".to_string()),
            ..WrapConfig::default()
        };
        let result = transform_file(source, "jobs.js", &config).expect("Should transform");
        assert_eq!(result.span_names(), vec!["jobs", "jobs"]);
    }
}
