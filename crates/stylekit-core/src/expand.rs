//! Source-to-source expansion driver
//!
//! One pass over a file:
//!
//! 1. scan for attached sites and `#name(...)` invocations
//! 2. expand expression macros, keeping their edits in original coordinates
//! 3. feed those results into the initializers attached macros will copy
//! 4. run each attached macro's peer, accessor and extension roles
//! 5. splice every result into the original text in one go
//!
//! Diagnostics from every role are collected; a failing role only loses
//! its own output.

use std::collections::HashMap;

use crate::config::Config;
use crate::diagnostic::{apply_edits, apply_fix_its, Diagnostic, TextEdit};
use crate::error::Result;
use crate::macros::{
    indent, AttachedMacro, EnvironmentKeyMacro, ExpansionContext, ExpressionMacro,
    FocusedValueMacro, HexColorMacro, StylableMacro, INDENT,
};
use crate::syntax::{
    parse_source, AttachedSite, AttributeSyntax, DeclSyntax, ExprSyntax, SourceRange,
};

/// Macros by the name they are invoked with
#[derive(Default)]
pub struct MacroRegistry {
    attached: HashMap<String, Box<dyn AttachedMacro>>,
    expressions: HashMap<String, Box<dyn ExpressionMacro>>,
}

impl MacroRegistry {
    /// A registry with nothing in it
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled macros under the names `config` gives them
    pub fn from_config(config: &Config) -> Self {
        let names = &config.macros;
        let mut registry = Self::new();
        registry.register_attached(&names.environment_value, EnvironmentKeyMacro);
        registry.register_attached(&names.focus_value, FocusedValueMacro);
        registry.register_attached(
            &names.stylable,
            StylableMacro::new(config.stylable.composition),
        );
        registry.register_expression(
            &names.color,
            HexColorMacro::new(config.output.color_type.clone()),
        );
        registry
    }

    pub fn register_attached(&mut self, name: &str, m: impl AttachedMacro + 'static) {
        self.attached.insert(name.to_string(), Box::new(m));
    }

    pub fn register_expression(&mut self, name: &str, m: impl ExpressionMacro + 'static) {
        self.expressions.insert(name.to_string(), Box::new(m));
    }

    pub fn attached(&self, name: &str) -> Option<&dyn AttachedMacro> {
        self.attached.get(name).map(|m| m.as_ref())
    }

    pub fn expression(&self, name: &str) -> Option<&dyn ExpressionMacro> {
        self.expressions.get(name).map(|m| m.as_ref())
    }
}

/// Result of expanding one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Expanded text; invocations whose expansion failed are left alone
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Expansion {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

pub struct Expander {
    registry: MacroRegistry,
}

impl Default for Expander {
    fn default() -> Self {
        Expander::from_config(&Config::default())
    }
}

impl Expander {
    pub fn new(registry: MacroRegistry) -> Self {
        Expander { registry }
    }

    pub fn from_config(config: &Config) -> Self {
        Expander::new(MacroRegistry::from_config(config))
    }

    /// Expand every registered macro in `source`
    pub fn expand(&self, source: &str) -> Result<Expansion> {
        let _span = tracing::debug_span!("expand", len = source.len()).entered();
        let file = parse_source(source)?;
        let mut ctx = ExpansionContext::new(source);

        let mut expression_edits = Vec::new();
        for node in &file.freestanding {
            let Some(m) = self.registry.expression(&node.name) else {
                tracing::trace!(name = %node.name, "not a registered expression macro");
                continue;
            };
            tracing::debug!(name = %node.name, start = node.range.start, "expanding expression macro");
            if let Some(expanded) = m.expand(node, &mut ctx) {
                expression_edits.push(TextEdit::replace(node.range, expanded));
            }
        }

        let mut edits = Vec::new();
        for site in &file.declarations {
            let decl = with_expanded_initializers(&site.decl, source, &expression_edits);
            for attribute in &site.attributes {
                let Some(m) = self.registry.attached(&attribute.name) else {
                    continue;
                };
                tracing::debug!(name = %attribute.name, start = attribute.range.start, "expanding attached macro");
                self.expand_site(m, attribute, site, &decl, &mut ctx, &mut edits);
            }
        }
        edits.extend(expression_edits);

        let mut diagnostics = ctx.into_diagnostics();
        diagnostics.sort_by_key(|d| d.range.start);
        tracing::info!(
            edits = edits.len(),
            diagnostics = diagnostics.len(),
            "expansion finished"
        );

        Ok(Expansion {
            source: apply_edits(source, &edits),
            diagnostics,
        })
    }

    fn expand_site(
        &self,
        m: &dyn AttachedMacro,
        attribute: &AttributeSyntax,
        site: &AttachedSite,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
        edits: &mut Vec<TextEdit>,
    ) {
        let peers = m.peers(attribute, decl, ctx);
        let accessors = m.accessors(attribute, decl, ctx);
        let extensions = m.extensions(attribute, decl, ctx);

        let source = ctx.source();
        let base = ctx.lines().indentation(source, site.range.start).to_string();

        edits.push(TextEdit::replace(
            attribute_with_trailing_space(source, attribute.range),
            "",
        ));

        if !accessors.is_empty() {
            let ty = m.accessor_type(attribute, decl);
            if let Some(edit) = accessor_edit(decl, &accessors, ty.as_deref(), &base) {
                edits.push(edit);
            }
        }

        for declaration in &peers {
            edits.push(TextEdit::insert(
                site.range.end,
                format!("\n\n{}", indent(declaration, &base)),
            ));
        }

        // Extensions are only legal at file scope
        let extension_base = if site.scope_end == site.range.end {
            base.as_str()
        } else {
            ""
        };
        for declaration in &extensions {
            edits.push(TextEdit::insert(
                site.scope_end,
                format!("\n\n{}", indent(declaration, extension_base)),
            ));
        }
    }

    /// Expand `source`, then apply every fix-it the diagnostics carry to the
    /// original text
    pub fn fix(&self, source: &str) -> Result<String> {
        let expansion = self.expand(source)?;
        Ok(apply_fix_its(source, &expansion.diagnostics))
    }
}

/// `range` extended over the whitespace that follows it, so removing an
/// attribute on its own line leaves the declaration where the attribute was
fn attribute_with_trailing_space(source: &str, range: SourceRange) -> SourceRange {
    let rest = &source[range.end..];
    let trailing = rest.len() - rest.trim_start().len();
    SourceRange::new(range.start, range.end + trailing)
}

/// Replace the property's storage (initializer or existing accessor block)
/// with a braced accessor block. An unannotated property is given `ty`.
fn accessor_edit(
    decl: &DeclSyntax,
    accessors: &[String],
    ty: Option<&str>,
    base: &str,
) -> Option<TextEdit> {
    let DeclSyntax::Variable(var) = decl else {
        return None;
    };
    let [binding] = var.bindings.as_slice() else {
        return None;
    };
    let (start, annotation) = match (&binding.type_annotation, ty) {
        (Some(written), _) => (written.range.end, String::new()),
        (None, Some(ty)) => (binding.pattern_range.end, format!(": {ty}")),
        (None, None) => (binding.pattern_range.end, String::new()),
    };

    let inner = format!("{base}{INDENT}");
    let body = accessors
        .iter()
        .map(|accessor| indent(accessor, &inner))
        .collect::<Vec<_>>()
        .join("\n");
    Some(TextEdit::replace(
        SourceRange::new(start, binding.range.end),
        format!("{annotation} {{\n{body}\n{base}}}"),
    ))
}

/// Copy of `decl` whose initializers contain the expanded form of any
/// expression macro inside them
fn with_expanded_initializers(decl: &DeclSyntax, source: &str, edits: &[TextEdit]) -> DeclSyntax {
    let mut decl = decl.clone();
    if let DeclSyntax::Variable(var) = &mut decl {
        for binding in &mut var.bindings {
            if let Some(init) = &mut binding.initializer {
                *init = rewrite_expr(init, source, edits);
            }
        }
    }
    decl
}

fn rewrite_expr(expr: &ExprSyntax, source: &str, edits: &[TextEdit]) -> ExprSyntax {
    let nested: Vec<TextEdit> = edits
        .iter()
        .filter(|edit| expr.range.contains(edit.range))
        .map(|edit| {
            TextEdit::replace(
                SourceRange::new(
                    edit.range.start - expr.range.start,
                    edit.range.end - expr.range.start,
                ),
                edit.replacement.clone(),
            )
        })
        .collect();
    if nested.is_empty() {
        return expr.clone();
    }
    let original = &source[expr.range.start..expr.range.end];
    ExprSyntax {
        text: apply_edits(original, &nested),
        range: expr.range,
        string_literal: None,
    }
}
