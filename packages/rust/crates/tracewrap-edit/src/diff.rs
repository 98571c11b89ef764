//! Diff generation utilities.
//!
//! Unified diff output for previews using the `similar` crate.

use similar::TextDiff;

/// Lines of context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Generate a unified diff between two strings, without file headers.
///
/// Empty when the inputs are equal.
#[must_use]
pub fn generate_unified_diff(original: &str, modified: &str) -> String {
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .to_string()
}

/// Unified diff with `---`/`+++` headers naming `path`; empty when equal.
#[must_use]
pub fn file_diff(path: &str, original: &str, modified: &str) -> String {
    if original == modified {
        return String::new();
    }
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}
