//! Language support for the syntax provider.
//!
//! Provides a `Lang` enum covering the TypeScript/JavaScript family
//! with automatic detection from file extensions.

use std::path::Path;

use serde::Serialize;
use tree_sitter::Language;

use crate::error::SyntaxError;

/// Supported source dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// TypeScript (`.ts`, `.mts`, `.cts`)
    TypeScript,
    /// TypeScript with JSX (`.tsx`)
    Tsx,
    /// JavaScript (`.js`, `.mjs`, `.cjs`)
    JavaScript,
    /// JavaScript with JSX (`.jsx`)
    Jsx,
}

impl Lang {
    /// Short identifier for the dialect
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::Tsx => "tsx",
            Self::JavaScript => "js",
            Self::Jsx => "jsx",
        }
    }

    /// Tree-sitter grammar used to parse this dialect.
    ///
    /// Plain TypeScript gets the `typescript` grammar so that `<T>expr`
    /// assertions parse; everything else goes through `tsx`, which is a
    /// superset of JavaScript with JSX.
    #[must_use]
    pub fn grammar(&self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx | Self::JavaScript | Self::Jsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Try to detect language from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::from_extension(&ext)
    }

    /// Try to detect language from extension string
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::Jsx),
            _ => None,
        }
    }

    /// Get file extensions for this language
    #[must_use]
    pub fn extensions(&self) -> Vec<&'static str> {
        match self {
            Self::TypeScript => vec!["ts", "mts", "cts"],
            Self::Tsx => vec!["tsx"],
            Self::JavaScript => vec!["js", "mjs", "cjs"],
            Self::Jsx => vec!["jsx"],
        }
    }

    /// Every extension the provider accepts.
    #[must_use]
    pub fn all_extensions() -> Vec<&'static str> {
        [Self::TypeScript, Self::Tsx, Self::JavaScript, Self::Jsx]
            .iter()
            .flat_map(Self::extensions)
            .collect()
    }
}

impl TryFrom<&str> for Lang {
    type Error = SyntaxError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "ts" | "typescript" => Ok(Self::TypeScript),
            "tsx" => Ok(Self::Tsx),
            "js" | "javascript" => Ok(Self::JavaScript),
            "jsx" => Ok(Self::Jsx),
            _ => Err(SyntaxError::UnsupportedLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_extensions() {
        assert_eq!(Lang::from_extension("mts"), Some(Lang::TypeScript));
        assert_eq!(Lang::from_extension("cjs"), Some(Lang::JavaScript));
        assert_eq!(Lang::from_extension("py"), None);
    }

    #[test]
    fn test_all_extensions() {
        let all = Lang::all_extensions();
        assert_eq!(all.len(), 8);
        assert!(all.contains(&"jsx"));
    }
}
