//! Diagnostics, fix-its, and the [`MacroError`] capability
//!
//! Every macro reports failures through a closed error enum that implements
//! [`MacroError`]. The expander turns those into [`Diagnostic`]s anchored at
//! the macro invocation, so nothing is ever thrown past an expansion.

use serde::Serialize;
use std::fmt;

use crate::syntax::{LineColumn, SourceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

/// Replace the text in `range` with `replacement`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: SourceRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: SourceRange, replacement: impl Into<String>) -> Self {
        TextEdit {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        TextEdit::replace(SourceRange::empty(offset), text)
    }
}

/// A machine-applicable suggestion attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixIt {
    pub message: String,
    pub id: String,
    pub edits: Vec<TextEdit>,
}

impl FixIt {
    pub fn new(id: impl Into<String>, message: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        FixIt {
            message: message.into(),
            id: id.into(),
            edits,
        }
    }
}

/// A domain error that knows how to present itself as a diagnostic.
///
/// `Display` supplies the message. Implementors override `severity` for
/// advisory cases and `fix_its` when the error carries its own suggestions.
pub trait MacroError: fmt::Display {
    /// Stable identifier, e.g. `invalidPropertyType`
    fn id(&self) -> &'static str;

    fn message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn fix_its(&self) -> Vec<FixIt> {
        Vec::new()
    }

    fn with_fix_its(self, fix_its: Vec<FixIt>) -> WithFixIts<Self>
    where
        Self: Sized,
    {
        WithFixIts {
            error: self,
            additional: fix_its,
        }
    }

    fn with_fix_it(self, fix_it: FixIt) -> WithFixIts<Self>
    where
        Self: Sized,
    {
        self.with_fix_its(vec![fix_it])
    }
}

/// A [`MacroError`] decorated with extra fix-its.
///
/// Message, id and severity come from the wrapped error unchanged; the
/// wrapped error's own fix-its are listed before the added ones.
#[derive(Debug, Clone)]
pub struct WithFixIts<E> {
    error: E,
    additional: Vec<FixIt>,
}

impl<E: MacroError> From<E> for WithFixIts<E> {
    fn from(error: E) -> Self {
        error.with_fix_its(Vec::new())
    }
}

impl<E: MacroError> fmt::Display for WithFixIts<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl<E: MacroError> MacroError for WithFixIts<E> {
    fn id(&self) -> &'static str {
        self.error.id()
    }

    fn message(&self) -> String {
        self.error.message()
    }

    fn severity(&self) -> Severity {
        self.error.severity()
    }

    fn fix_its(&self) -> Vec<FixIt> {
        let mut fix_its = self.error.fix_its();
        fix_its.extend(self.additional.iter().cloned());
        fix_its
    }
}

/// A reported problem, anchored at a source range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: String,
    pub message: String,
    pub severity: Severity,
    pub range: SourceRange,
    pub location: LineColumn,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fix_its: Vec<FixIt>,
}

impl Diagnostic {
    pub fn from_error(error: &dyn MacroError, range: SourceRange, location: LineColumn) -> Self {
        Diagnostic {
            id: error.id().to_string(),
            message: error.message(),
            severity: error.severity(),
            range,
            location,
            fix_its: error.fix_its(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Apply non-overlapping edits to `source`.
///
/// Edits are applied in start order; an edit that begins inside a range
/// already replaced is dropped.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in sorted {
        if edit.range.start < cursor {
            tracing::trace!(?edit.range, "skipping overlapping edit");
            continue;
        }
        output.push_str(&source[cursor..edit.range.start]);
        output.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    output.push_str(&source[cursor..]);
    output
}

/// Apply every fix-it carried by `diagnostics`
pub fn apply_fix_its(source: &str, diagnostics: &[Diagnostic]) -> String {
    let edits: Vec<TextEdit> = diagnostics
        .iter()
        .flat_map(|d| d.fix_its.iter())
        .flat_map(|fix_it| fix_it.edits.iter().cloned())
        .collect();
    apply_edits(source, &edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Advisory;

    impl fmt::Display for Advisory {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("just so you know")
        }
    }

    impl MacroError for Advisory {
        fn id(&self) -> &'static str {
            "advisory"
        }

        fn severity(&self) -> Severity {
            Severity::Note
        }

        fn fix_its(&self) -> Vec<FixIt> {
            vec![FixIt::new("own", "built in", Vec::new())]
        }
    }

    #[test]
    fn test_defaults() {
        struct Plain;
        impl fmt::Display for Plain {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("plain")
            }
        }
        impl MacroError for Plain {
            fn id(&self) -> &'static str {
                "plain"
            }
        }

        assert_eq!(Plain.severity(), Severity::Error);
        assert!(Plain.fix_its().is_empty());
        assert_eq!(Plain.message(), "plain");
    }

    #[test]
    fn test_wrapper_passes_through_and_appends() {
        let wrapped = Advisory
            .with_fix_it(FixIt::new("a", "first added", Vec::new()))
            .with_fix_it(FixIt::new("b", "second added", Vec::new()));

        assert_eq!(wrapped.message(), "just so you know");
        assert_eq!(wrapped.severity(), Severity::Note);
        assert_eq!(wrapped.id(), "advisory");
        let ids: Vec<String> = wrapped.fix_its().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, vec!["own", "a", "b"]);
    }

    #[test]
    fn test_apply_edits_skips_nested() {
        let source = "let x = #color(\"fff\")";
        let edits = vec![
            TextEdit::replace(SourceRange::new(8, 21), "Color.white"),
            TextEdit::replace(SourceRange::new(15, 20), "nope"),
            TextEdit::replace(SourceRange::new(0, 3), "var"),
        ];
        assert_eq!(apply_edits(source, &edits), "var x = Color.white");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let edits = vec![TextEdit::insert(3, "b"), TextEdit::insert(3, "c")];
        assert_eq!(apply_edits("aaadd", &edits), "aaabcdd");
    }
}
