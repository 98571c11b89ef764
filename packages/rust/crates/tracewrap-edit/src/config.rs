//! Wrapping configuration.
//!
//! `WrapConfig` is what callers hand to the engine. It deserializes from a
//! `tracewrap.toml` file; every field has a default.
//!
//! ```toml
//! skip = ["^_", "/^test/i"]
//! name_pattern = "{file}.{name}"
//!
//! [instrumentation]
//! function = "traceCall"
//! module = "autotel"
//! import_style = "auto"
//! ```

use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EditError;

/// Default instrumentation entry point.
pub const DEFAULT_FUNCTION_NAME: &str = "traceCall";
/// Default module the entry point is imported from.
pub const DEFAULT_MODULE_PATH: &str = "autotel";

/// Engine configuration for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Regexes; a matching identifier is skipped with `nameMatch`.
    /// JavaScript literal form (`/^_/i`) is accepted too.
    pub skip: Vec<String>,
    /// Span-name template with `{name}` and `{file}` tokens.
    pub name_pattern: Option<String>,
    /// Instrumentation call emitted by the rewriter.
    pub instrumentation: InstrumentationConfig,
}

/// The opaque instrumentation call and where it is imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    /// Identifier called by wrapped code.
    #[serde(rename = "function")]
    pub function_name: String,
    /// Module path the identifier is imported from.
    #[serde(rename = "module")]
    pub module_path: String,
    /// `import` vs `require` for the inserted binding.
    pub import_style: ImportStyle,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            module_path: DEFAULT_MODULE_PATH.to_string(),
            import_style: ImportStyle::Auto,
        }
    }
}

/// Module syntax used for the inserted binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStyle {
    /// Pick per file: CommonJS for `.cjs`/`.cts` and `require`-only files,
    /// ESM for `.mjs`/`.mts` and everything else.
    #[default]
    Auto,
    /// `import { f } from 'm';`
    Esm,
    /// `const { f } = require('m');`
    CommonJs,
}

impl FromStr for ImportStyle {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "esm" | "module" | "import" => Ok(Self::Esm),
            "commonjs" | "cjs" | "require" => Ok(Self::CommonJs),
            _ => Err(EditError::Config(format!("unknown import style: {s}"))),
        }
    }
}

impl WrapConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, EditError> {
        toml::from_str(content).map_err(|e| EditError::Config(e.to_string()))
    }

    /// Load a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EditError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EditError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Check values that would otherwise produce invalid output.
    pub fn validate(&self) -> Result<(), EditError> {
        if !is_identifier(&self.instrumentation.function_name) {
            return Err(EditError::Pattern(format!(
                "instrumentation function `{}` is not a valid identifier",
                self.instrumentation.function_name
            )));
        }
        let module = &self.instrumentation.module_path;
        if module.is_empty() || module.contains(['\'', '\n', '\r', '\\']) {
            return Err(EditError::Config(format!(
                "invalid instrumentation module path: {module:?}"
            )));
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Compiled skip patterns.
#[derive(Debug, Clone, Default)]
pub struct SkipMatcher {
    patterns: Vec<Regex>,
}

impl SkipMatcher {
    /// Compile `patterns`.
    ///
    /// # Errors
    /// `EditError::Pattern` naming the first pattern that fails to compile.
    pub fn new(patterns: &[String]) -> Result<Self, EditError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&regex_source(p))
                    .map_err(|e| EditError::Pattern(format!("invalid skip pattern `{p}`: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches `identifier`.
    #[must_use]
    pub fn is_match(&self, identifier: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(identifier))
    }

    /// No patterns configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translate a JavaScript regex literal (`/body/flags`) into a Rust pattern.
///
/// Anything not in literal form is used as-is. Only the `i`, `m` and `s`
/// flags have an equivalent; `g`, `u` and `y` are irrelevant for matching.
fn regex_source(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix('/')
        && let Some(close) = rest.rfind('/')
    {
        let (body, flags) = (&rest[..close], &rest[close + 1..]);
        if flags.chars().all(|c| "gimsuy".contains(c)) {
            let inline: String = flags.chars().filter(|c| "ims".contains(*c)).collect();
            return if inline.is_empty() {
                body.to_string()
            } else {
                format!("(?{inline}){body}")
            };
        }
    }
    pattern.to_string()
}
