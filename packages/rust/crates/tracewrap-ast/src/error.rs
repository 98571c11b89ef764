//! Error types for parsing and edit application.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Source text could not be parsed into a clean tree.
///
/// Positions are 1-indexed and point at the first ERROR or MISSING node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parse error at {line}:{column}: {found}")]
pub struct ParseError {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
    /// Short description of what the parser choked on.
    pub found: String,
}

/// Error types for syntax provider operations.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// Source is not syntactically valid.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Extension or language name not handled by the provider.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Grammar could not be loaded into the parser.
    #[error("Grammar error: {0}")]
    Grammar(String),

    /// Two edits touch the same bytes.
    #[error("Overlapping edits at bytes {first_end} and {second_start}")]
    OverlappingEdits {
        /// End of the earlier edit.
        first_end: usize,
        /// Start of the later edit.
        second_start: usize,
    },

    /// Edit range is outside the source or splits a UTF-8 character.
    #[error("Invalid edit range {start}..{end}")]
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },
}
