//! Macro generators and the context they report into
//!
//! An attached macro runs once per role (peers, accessors, extensions) for
//! each declaration it annotates. Each role validates independently and
//! reports failures to the [`ExpansionContext`]; a failed role yields no
//! output but never stops the other roles from running.

mod hex_color;
mod key;
mod stylable;

pub use hex_color::{HexColorMacro, HexColorMacroError};
pub use key::{EnvironmentKeyMacro, FocusedValueMacro, KeyBinding, KeyMacro, KeyMacroError};
pub use stylable::{
    Argument, ArgumentFactory, CompositionOrder, DeclarationFactory, StylableArguments,
    StylableMacro, StylableMacroError,
};

use crate::diagnostic::{Diagnostic, MacroError};
use crate::syntax::{AttributeSyntax, DeclSyntax, FreestandingSyntax, LineIndex, SourceRange};

/// Indentation unit of generated code
pub const INDENT: &str = "    ";

/// Collects the diagnostics of one file's expansion
pub struct ExpansionContext<'a> {
    source: &'a str,
    lines: LineIndex,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(source: &'a str) -> Self {
        ExpansionContext {
            source,
            lines: LineIndex::new(source),
            diagnostics: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Attach `error` to `range`
    pub fn diagnose(&mut self, range: SourceRange, error: impl MacroError) {
        let location = self.lines.location(self.source, range.start);
        let diagnostic = Diagnostic::from_error(&error, range, location);
        tracing::debug!(id = %diagnostic.id, %location, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Unwrap `result`, diagnosing the error at `range` when there is one
    pub fn report<T, E: MacroError>(&mut self, range: SourceRange, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.diagnose(range, error);
                None
            }
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A macro written as an `@Attribute` on a declaration
///
/// Each role defaults to producing nothing.
pub trait AttachedMacro {
    /// Declarations to place next to the annotated one
    fn peers(
        &self,
        _node: &AttributeSyntax,
        _decl: &DeclSyntax,
        _ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        Vec::new()
    }

    /// Accessors (`get { ... }`, `set { ... }`) replacing the property's storage
    fn accessors(
        &self,
        _node: &AttributeSyntax,
        _decl: &DeclSyntax,
        _ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        Vec::new()
    }

    /// Type to write on a property that has no annotation once its storage
    /// is replaced by accessors, since a computed property must be typed
    fn accessor_type(&self, _node: &AttributeSyntax, _decl: &DeclSyntax) -> Option<String> {
        None
    }

    /// Complete `extension` declarations for the annotated type
    fn extensions(
        &self,
        _node: &AttributeSyntax,
        _decl: &DeclSyntax,
        _ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        Vec::new()
    }
}

/// A macro written as a `#name(...)` expression
pub trait ExpressionMacro {
    /// Replacement expression, or `None` after reporting a diagnostic
    fn expand(&self, node: &FreestandingSyntax, ctx: &mut ExpansionContext<'_>) -> Option<String>;
}

/// Prefix every non-empty line of `text` with `prefix`
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{ ... }` with `members` indented one level
pub(crate) fn braced(header: &str, members: &[String]) -> String {
    let body = members
        .iter()
        .map(|member| indent(member, INDENT))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{header} {{\n{body}\n}}")
}
