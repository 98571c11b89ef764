//! Text edits over a parsed source.
//!
//! Edits are collected as `(span, replacement)` pairs against the original
//! byte offsets and applied together, so no edit invalidates another.

use std::ops::Range;

use serde::Serialize;

use crate::error::SyntaxError;

/// A single replacement of `start..end` with `text`.
///
/// An empty range is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    /// Start byte offset in the original source.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Replacement text.
    pub text: String,
}

impl TextEdit {
    /// Replace `range` with `text`.
    #[must_use]
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: text.into(),
        }
    }

    /// Insert `text` at byte `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            start: offset,
            end: offset,
            text: text.into(),
        }
    }

    /// Whether this edit only inserts text.
    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Apply all `edits` to `source` in one pass.
///
/// Edits are ordered by start offset; an insertion lands before a
/// replacement that starts at the same offset. Insertions sharing an
/// offset keep their relative order.
///
/// # Errors
/// `SyntaxError::InvalidRange` for ranges outside `source` or off a char
/// boundary, `SyntaxError::OverlappingEdits` when two edits overlap.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, SyntaxError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.start, e.end));

    let extra: usize = ordered.iter().map(|e| e.text.len()).sum();
    let mut output = String::with_capacity(source.len() + extra);
    let mut cursor = 0;

    for edit in ordered {
        if edit.start > edit.end
            || edit.end > source.len()
            || !source.is_char_boundary(edit.start)
            || !source.is_char_boundary(edit.end)
        {
            return Err(SyntaxError::InvalidRange {
                start: edit.start,
                end: edit.end,
            });
        }
        if edit.start < cursor {
            return Err(SyntaxError::OverlappingEdits {
                first_end: cursor,
                second_start: edit.start,
            });
        }
        output.push_str(&source[cursor..edit.start]);
        output.push_str(&edit.text);
        cursor = edit.end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}
