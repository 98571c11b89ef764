//! Parsed source files.
//!
//! `SourceTree` owns the tree-sitter tree and borrows the text it was
//! parsed from, so any node can be turned back into its exact source slice.

use tree_sitter::{Node, Parser, Tree};

use crate::error::{ParseError, SyntaxError};
use crate::lang::Lang;

/// A syntactically valid source file and its syntax tree.
pub struct SourceTree<'s> {
    source: &'s str,
    tree: Tree,
    lang: Lang,
}

impl std::fmt::Debug for SourceTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTree")
            .field("lang", &self.lang)
            .field("len", &self.source.len())
            .finish_non_exhaustive()
    }
}

impl<'s> SourceTree<'s> {
    /// Parse `source` with the grammar for `lang`.
    ///
    /// # Errors
    /// Returns `SyntaxError::Parse` when the tree contains any ERROR or
    /// MISSING node. No partial tree is handed out.
    pub fn parse(source: &'s str, lang: Lang) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&lang.grammar())
            .map_err(|e| SyntaxError::Grammar(e.to_string()))?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError {
            line: 1,
            column: 1,
            found: "parser produced no tree".to_string(),
        })?;

        if let Some(bad) = first_error(tree.root_node()) {
            let pos = bad.start_position();
            let found = if bad.is_missing() {
                format!("missing `{}`", bad.kind())
            } else {
                let snippet: String = source[bad.byte_range()].chars().take(24).collect();
                format!("unexpected `{}`", snippet.trim())
            };
            return Err(ParseError {
                line: pos.row + 1,
                column: pos.column + 1,
                found,
            }
            .into());
        }

        Ok(Self { source, tree, lang })
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Dialect this tree was parsed as.
    #[must_use]
    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Root `program` node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Exact source text of `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    /// Text of the named field `field` of `node`, if present.
    #[must_use]
    pub fn field_text(&self, node: Node<'_>, field: &str) -> Option<&'s str> {
        node.child_by_field_name(field).map(|n| self.text(n))
    }

    /// 1-indexed line containing byte `offset`.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.source[..offset.min(self.source.len())]
            .matches('\n')
            .count()
            + 1
    }

    /// Line terminator of the source, taken from its first line break.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        match self.source.find('\n') {
            Some(i) if self.source[..i].ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }

    /// Leading whitespace of the line containing byte `offset`.
    #[must_use]
    pub fn indent_at(&self, offset: usize) -> &'s str {
        let offset = offset.min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line = &self.source[line_start..];
        let width = line
            .char_indices()
            .find(|(_, c)| *c != ' ' && *c != '\t')
            .map_or(line.len(), |(i, _)| i);
        &line[..width]
    }
}

/// Depth-first search for the first ERROR or MISSING node.
///
/// Subtrees without errors are skipped entirely.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    if !root.has_error() {
        return None;
    }

    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_typescript() {
        let source = "export function add(a: number, b: number): number { return a + b; }\n";
        let tree = SourceTree::parse(source, Lang::TypeScript).expect("Should parse");
        assert_eq!(tree.root().kind(), "program");
        assert_eq!(tree.lang(), Lang::TypeScript);
    }

    #[test]
    fn test_parse_error_position() {
        let source = "function ok() {}\nfunction broken( {\n";
        let err = SourceTree::parse(source, Lang::JavaScript).expect_err("Should fail");
        match err {
            SyntaxError::Parse(p) => assert!(p.line >= 2, "error reported on line {}", p.line),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_indent_at() {
        let source = "class A {\n    run() {}\n}\n";
        let tree = SourceTree::parse(source, Lang::TypeScript).expect("Should parse");
        let offset = source.find("run").expect("method present");
        assert_eq!(tree.indent_at(offset), "    ");
        assert_eq!(tree.line_of(offset), 2);
    }
}
