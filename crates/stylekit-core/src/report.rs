use serde::Serialize;
use std::path::Path;

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::{Error, Result};
use crate::expand::Expansion;

/// Machine-readable result of expanding or checking one file
#[derive(Debug, Clone, Serialize)]
pub struct ExpansionReport {
    /// Report format version (currently "1.0")
    pub format_version: String,

    /// Input file as given on the command line
    pub file: String,

    /// Expanded text; absent for check-only runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<String>,

    pub diagnostics: Vec<Diagnostic>,

    pub summary: Summary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
}

impl Summary {
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        diagnostics
            .iter()
            .fold(Summary::default(), |mut summary, diagnostic| {
                match diagnostic.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Note => summary.notes += 1,
                }
                summary
            })
    }
}

impl ExpansionReport {
    pub fn new(file: impl Into<String>, expansion: Expansion, include_source: bool) -> Self {
        let summary = Summary::of(&expansion.diagnostics);
        ExpansionReport {
            format_version: "1.0".to_string(),
            file: file.into(),
            expanded: include_source.then_some(expansion.source),
            diagnostics: expansion.diagnostics,
            summary,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::Expander;

    #[test]
    fn test_report_json_shape() {
        let expansion = Expander::default()
            .expand("@EnvironmentValue let x = 5\n")
            .unwrap();
        let report = ExpansionReport::new("Values.swift", expansion, false);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["format_version"], "1.0");
        assert_eq!(value["file"], "Values.swift");
        assert!(value.get("expanded").is_none());
        assert_eq!(value["summary"]["errors"], 2);

        let first = &value["diagnostics"][0];
        assert_eq!(first["id"], "invalidPropertyType");
        assert_eq!(first["severity"], "error");
        assert_eq!(first["location"]["line"], 1);
        assert_eq!(first["location"]["column"], 1);
        assert_eq!(first["fix_its"][0]["edits"][0]["replacement"], "var");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let expansion = Expander::default().expand("let a = 1\n").unwrap();
        ExpansionReport::new("a.swift", expansion, true)
            .write_to_file(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["expanded"], "let a = 1\n");
        assert_eq!(value["summary"]["notes"], 0);
    }
}
