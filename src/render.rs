//! Human-readable diagnostic output

use colored::{ColoredString, Colorize};
use stylekit_core::{Diagnostic, Severity, Summary};

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string();
    match severity {
        Severity::Error => label.red().bold(),
        Severity::Warning => label.yellow().bold(),
        Severity::Note => label.cyan().bold(),
    }
}

/// Render `diagnostic` with the offending source line underneath:
///
/// ```text
/// error[invalidPropertyType]: The macro can only be applied to a 'var' property
///  --> Values.swift:2:5
///   |
/// 2 |     @EnvironmentValue let x = 5
///   |     ^^^^^^^^^^^^^^^^^
///   = fix-it: Replace 'let' with 'var'
/// ```
pub fn render_diagnostic(diagnostic: &Diagnostic, file: &str, source: &str) -> String {
    let location = diagnostic.location;
    let line_start = source[..diagnostic.range.start.min(source.len())]
        .rfind('\n')
        .map_or(0, |i| i + 1);
    let line_end = source[line_start..]
        .find('\n')
        .map_or(source.len(), |i| line_start + i);
    let line = &source[line_start..line_end];

    let column = location.column.saturating_sub(1);
    let underline_end = diagnostic.range.end.min(line_end).max(diagnostic.range.start);
    let width = source[diagnostic.range.start.min(source.len())..underline_end]
        .chars()
        .count()
        .max(1);

    let number = location.line.to_string();
    let gutter = " ".repeat(number.len());
    let bar = "|".blue().bold();

    let mut out = format!(
        "{}{}: {}\n",
        severity_label(diagnostic.severity),
        format!("[{}]", diagnostic.id).bold(),
        diagnostic.message.bold()
    );
    out.push_str(&format!("{gutter}{} {file}:{location}\n", "-->".blue().bold()));
    out.push_str(&format!("{gutter} {bar}\n"));
    out.push_str(&format!("{} {bar} {line}\n", number.blue().bold()));
    out.push_str(&format!(
        "{gutter} {bar} {}{}\n",
        " ".repeat(column),
        "^".repeat(width).red().bold()
    ));
    for fix_it in &diagnostic.fix_its {
        out.push_str(&format!("{gutter} {} fix-it: {}\n", "=".blue().bold(), fix_it.message));
    }
    out
}

/// One-line tally, e.g. `2 errors, 1 note`
pub fn render_summary(summary: &Summary) -> String {
    let parts: Vec<String> = [
        (summary.errors, "error"),
        (summary.warnings, "warning"),
        (summary.notes, "note"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, noun)| {
        if count == 1 {
            format!("{count} {noun}")
        } else {
            format!("{count} {noun}s")
        }
    })
    .collect();

    if parts.is_empty() {
        "no problems found".green().to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stylekit_core::Expander;

    #[test]
    fn test_render_points_at_attribute() {
        colored::control::set_override(false);
        let source = "extension EnvironmentValues {\n    @EnvironmentValue let x = 5\n}\n";
        let expansion = Expander::default().expand(source).unwrap();

        let rendered = render_diagnostic(&expansion.diagnostics[0], "Values.swift", source);
        assert_eq!(
            rendered,
            "\
error[invalidPropertyType]: The macro can only be applied to a 'var' property
 --> Values.swift:2:5
  |
2 |     @EnvironmentValue let x = 5
  |     ^^^^^^^^^^^^^^^^^
  = fix-it: Replace 'let' with 'var'
"
        );
    }

    #[test]
    fn test_summary() {
        colored::control::set_override(false);
        assert_eq!(render_summary(&Summary::default()), "no problems found");
        let summary = Summary {
            errors: 2,
            warnings: 0,
            notes: 1,
        };
        assert_eq!(render_summary(&summary), "2 errors, 1 note");
    }
}
