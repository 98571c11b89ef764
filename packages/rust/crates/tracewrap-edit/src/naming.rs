//! Span-name resolution.
//!
//! Substitutes `{name}` and `{file}` into the configured template in a
//! single left-to-right scan, so substituted text is never re-expanded.

use std::path::Path;

/// Token replaced by the node identifier.
pub const NAME_TOKEN: &str = "{name}";
/// Token replaced by the source file stem.
pub const FILE_TOKEN: &str = "{file}";

/// Resolve the span name for `identifier` declared in `file_path`.
///
/// Without a template the identifier is used verbatim.
///
/// # Example
///
/// ```rust
/// use tracewrap_edit::resolve_name;
///
/// let name = resolve_name("UserService.create", "src/users/service.ts", Some("{file}:{name}"));
/// assert_eq!(name, "service:UserService.create");
/// ```
#[must_use]
pub fn resolve_name(identifier: &str, file_path: &str, name_pattern: Option<&str>) -> String {
    let Some(pattern) = name_pattern else {
        return identifier.to_string();
    };

    let file = file_stem(file_path);
    let mut out = String::with_capacity(pattern.len() + identifier.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix(NAME_TOKEN) {
            out.push_str(identifier);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(FILE_TOKEN) {
            out.push_str(file);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Base name of `file_path` with its last extension stripped.
fn file_stem(file_path: &str) -> &str {
    Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
}

/// Render `name` as a single-quoted JavaScript string literal.
#[must_use]
pub fn quote_literal(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identifier() {
        assert_eq!(resolve_name("createUser", "a/b.ts", None), "createUser");
    }

    #[test]
    fn test_tokens_substituted_once() {
        // An identifier containing a token must not be expanded again.
        let name = resolve_name("{file}", "src/orders.service.ts", Some("{name}@{file}"));
        assert_eq!(name, "{file}@orders.service");
    }

    #[test]
    fn test_unknown_braces_copied() {
        let name = resolve_name("run", "job.js", Some("{svc}/{name}{"));
        assert_eq!(name, "{svc}/run{");
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("it's"), r"'it\'s'");
        assert_eq!(quote_literal(r"a\b"), r"'a\\b'");
    }
}
