//! Declaration inspection over Swift source text
//!
//! This is not a Swift parser. The lexer understands enough of
//! the token grammar (strings, comments, nesting) to find attribute-annotated
//! declarations and freestanding `#macro(...)` expressions, and the scanner
//! records only what the macros inspect: names, modifiers, bindings, type
//! annotations, initializers, and inheritance clauses, all with byte ranges
//! into the original text.

mod ast;
mod lexer;
mod parser;

pub use ast::{
    Argument, AttachedSite, AttributeSyntax, DeclSyntax, ExprSyntax, FreestandingSyntax, Mutability,
    NominalKind, PatternBinding, SourceFileSyntax, TypeDecl, TypeSyntax, VariableDecl,
};
pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use parser::parse_source;

use serde::Serialize;
use std::fmt;

/// Half-open byte range into a source string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub const fn new(start: usize, end: usize) -> Self {
        SourceRange { start, end }
    }

    pub const fn empty(offset: usize) -> Self {
        SourceRange::new(offset, offset)
    }

    pub fn contains(&self, other: SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// 1-based position for humans
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line index for converting byte offsets to [`LineColumn`]
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { line_starts }
    }

    pub fn location(&self, source: &str, offset: usize) -> LineColumn {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column = source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        LineColumn {
            line: line + 1,
            column: column + 1,
        }
    }

    /// Leading whitespace of the line containing `offset`
    pub fn indentation<'a>(&self, source: &'a str, offset: usize) -> &'a str {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let rest = &source[self.line_starts[line]..];
        let width = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        &rest[..width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let source = "ab\ncdé\nf";
        let index = LineIndex::new(source);
        assert_eq!(index.location(source, 0), LineColumn { line: 1, column: 1 });
        assert_eq!(index.location(source, 3), LineColumn { line: 2, column: 1 });
        assert_eq!(index.location(source, 8), LineColumn { line: 3, column: 1 });
        assert_eq!(index.location(source, 7), LineColumn { line: 2, column: 4 });
    }

    #[test]
    fn test_indentation() {
        let source = "struct A {\n    @Foo var x = 1\n}";
        let index = LineIndex::new(source);
        assert_eq!(index.indentation(source, 20), "    ");
        assert_eq!(index.indentation(source, 0), "");
    }
}
