//! Error types for wrapping operations.
//!
//! Follows the workspace convention: library crates use `thiserror` for
//! explicit error enums.

use thiserror::Error;
use tracewrap_ast::{ParseError, SyntaxError};

/// Error types for transform operations.
///
/// Each variant represents a specific failure mode in the wrapping pipeline.
#[derive(Error, Debug)]
pub enum EditError {
    /// Source file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Source file exceeds the size limit.
    #[error("File too large: {0} bytes (limit: {1})")]
    TooLarge(u64, u64),

    /// Source file contains NUL bytes.
    #[error("Binary file detected")]
    BinaryFile,

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse source code into a tree. Fatal for the file.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid skip pattern or name template.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Extension not handled by the syntax provider.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Edits could not be applied to the source.
    #[error("Replacement error: {0}")]
    Replacement(String),

    /// Configuration file could not be read or decoded.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<SyntaxError> for EditError {
    fn from(err: SyntaxError) -> Self {
        match err {
            SyntaxError::Parse(p) => Self::Parse(p),
            SyntaxError::UnsupportedLanguage(lang) => Self::UnsupportedLanguage(lang),
            other => Self::Replacement(other.to_string()),
        }
    }
}
