//! `@Stylable`: style protocol, aggregation wrapper, and environment modifier
//!
//! ```swift
//! @Stylable(environmentKey: "cardStyle", accessLevel: .public)
//! public struct Card: View { ... }
//! ```
//!
//! The peer role emits `protocol CardStyle: ViewStyle`. The extension role
//! emits `Card.AggregatedStyle`, which composes a newly applied style with
//! the one already in the environment, and `Card.StyleViewModifier`, which
//! puts that aggregate back into the environment for child views.

use serde::Deserialize;
use thiserror::Error;

use super::{braced, AttachedMacro, ExpansionContext};
use crate::access::AccessLevel;
use crate::diagnostic::{MacroError, Severity};
use crate::syntax::{AttributeSyntax, DeclSyntax, ExprSyntax, NominalKind};

/// Capability every stylable subject is expected to conform to
const BASE_CAPABILITY: &str = "View";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StylableMacroError {
    #[error("'{0}' does not conform to protocol 'View'")]
    MissingViewConformance(String),

    #[error("The macro can only be applied to a struct, class, or enum")]
    InvalidDeclaration,

    #[error("The access level '{0}' is invalid.")]
    InvalidAccessModifier(String),
}

impl MacroError for StylableMacroError {
    fn id(&self) -> &'static str {
        match self {
            StylableMacroError::MissingViewConformance(_) => "missingViewConformance",
            StylableMacroError::InvalidDeclaration => "invalidDeclaration",
            StylableMacroError::InvalidAccessModifier(_) => "invalidAccessModifier",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            StylableMacroError::MissingViewConformance(_) => Severity::Note,
            _ => Severity::Error,
        }
    }
}

/// Keys accepted in `@Stylable(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    StyleProtocol,
    Configurations,
    EnvironmentKey,
    AccessLevel,
}

impl Argument {
    pub fn label(&self) -> &'static str {
        match self {
            Argument::StyleProtocol => "style",
            Argument::Configurations => "configurations",
            Argument::EnvironmentKey => "environmentKey",
            Argument::AccessLevel => "accessLevel",
        }
    }
}

/// Every argument with defaults filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylableArguments {
    pub type_name: String,
    /// Name the generated extension extends, qualified for nested types
    pub extended_type: String,
    pub style_protocol: String,
    pub configurations: String,
    pub environment_key: String,
    pub access_level: AccessLevel,
}

/// Resolves [`Argument`]s from an invocation, falling back to values
/// derived from the subject type. Unknown labels are ignored.
pub struct ArgumentFactory<'a> {
    node: &'a AttributeSyntax,
    type_name: &'a str,
    subject_access: AccessLevel,
}

impl<'a> ArgumentFactory<'a> {
    pub fn new(node: &'a AttributeSyntax, type_name: &'a str, subject_access: AccessLevel) -> Self {
        ArgumentFactory {
            node,
            type_name,
            subject_access,
        }
    }

    fn supplied(&self, argument: Argument) -> Option<&'a ExprSyntax> {
        self.node.argument(argument.label())
    }

    /// A name argument, written as a string literal or as `Type.self`
    fn supplied_name(&self, argument: Argument) -> Option<String> {
        let value = self.supplied(argument)?;
        let name = match &value.string_literal {
            Some(literal) => literal.clone(),
            None => value.text.trim().trim_end_matches(".self").to_string(),
        };
        (!name.is_empty()).then_some(name)
    }

    pub fn style_protocol(&self) -> String {
        self.supplied_name(Argument::StyleProtocol)
            .unwrap_or_else(|| format!("{}Style", self.type_name))
    }

    pub fn configurations(&self) -> String {
        self.supplied_name(Argument::Configurations)
            .unwrap_or_else(|| format!("{}Configuration", self.style_protocol()))
    }

    pub fn environment_key(&self) -> String {
        self.supplied_name(Argument::EnvironmentKey)
            .unwrap_or_else(|| lowercase_first(&self.style_protocol()))
    }

    pub fn access_level(&self) -> Result<AccessLevel, StylableMacroError> {
        let Some(value) = self.supplied(Argument::AccessLevel) else {
            return Ok(self.subject_access);
        };
        let written = value.string_or_member().unwrap_or(value.text.as_str());
        written
            .parse()
            .map_err(|_| StylableMacroError::InvalidAccessModifier(written.to_string()))
    }

    pub fn resolve(&self) -> Result<StylableArguments, StylableMacroError> {
        Ok(StylableArguments {
            type_name: self.type_name.to_string(),
            extended_type: self.type_name.to_string(),
            style_protocol: self.style_protocol(),
            configurations: self.configurations(),
            environment_key: self.environment_key(),
            access_level: self.access_level()?,
        })
    }
}

fn lowercase_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How `AggregatedStyle` layers a newly applied style over the current one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionOrder {
    /// `style` renders first and `currentStyle` wraps its output
    #[default]
    StyleInnermost,
    /// `currentStyle` renders first and `style` wraps its output
    CurrentInnermost,
}

/// Source text for the declarations `@Stylable` produces
pub struct DeclarationFactory<'a> {
    args: &'a StylableArguments,
    composition: CompositionOrder,
}

impl<'a> DeclarationFactory<'a> {
    pub fn new(args: &'a StylableArguments, composition: CompositionOrder) -> Self {
        DeclarationFactory { args, composition }
    }

    pub fn style_protocol(&self) -> String {
        let StylableArguments {
            style_protocol,
            configurations,
            access_level,
            ..
        } = self.args;
        let header = format!(
            "{}protocol {style_protocol}: ViewStyle where Configuration == {configurations}",
            access_level.declaration_prefix()
        );
        braced(&header, &[format!("typealias Configuration = {configurations}")])
    }

    pub fn aggregated_style(&self) -> String {
        let style = &self.args.style_protocol;
        let member = self.args.access_level.member_prefix();
        let (inner, outer) = match self.composition {
            CompositionOrder::StyleInnermost => ("style", "currentStyle"),
            CompositionOrder::CurrentInnermost => ("currentStyle", "style"),
        };

        let header = format!(
            "{}struct AggregatedStyle<Style: {style}>: {style}",
            self.args.access_level.declaration_prefix()
        );
        braced(
            &header,
            &[
                format!("let currentStyle: any {style}\nlet style: Style"),
                String::new(),
                braced(
                    &format!("{member}init(currentStyle: any {style}, style: Style)"),
                    &["self.currentStyle = currentStyle\nself.style = style".to_string()],
                ),
                String::new(),
                braced(
                    &format!("{member}func makeBody(configuration: Configuration) -> some View"),
                    &[format!(
                        "let styled = configuration.withContent({inner}.makeBody(configuration: configuration))\n\
                         return AnyView({outer}.makeBody(configuration: styled))"
                    )],
                ),
            ],
        )
    }

    pub fn style_view_modifier(&self) -> String {
        let style = &self.args.style_protocol;
        let key = &self.args.environment_key;
        let member = self.args.access_level.member_prefix();

        let header = format!(
            "{}struct StyleViewModifier<Style: {style}>: ViewModifier",
            self.args.access_level.declaration_prefix()
        );
        braced(
            &header,
            &[
                format!("@Environment(\\.{key}) private var currentStyle\nlet style: Style"),
                String::new(),
                braced(
                    &format!("{member}init(style: Style)"),
                    &["self.style = style".to_string()],
                ),
                String::new(),
                braced(
                    &format!("{member}func body(content: Content) -> some View"),
                    &[format!(
                        "content.environment(\\.{key}, AggregatedStyle(currentStyle: currentStyle, style: style))"
                    )],
                ),
            ],
        )
    }

    pub fn extension(&self) -> String {
        braced(
            &format!("extension {}", self.args.extended_type),
            &[
                self.aggregated_style(),
                String::new(),
                self.style_view_modifier(),
            ],
        )
    }
}

/// `@Stylable`
#[derive(Debug, Clone, Copy, Default)]
pub struct StylableMacro {
    pub composition: CompositionOrder,
}

impl StylableMacro {
    pub fn new(composition: CompositionOrder) -> Self {
        StylableMacro { composition }
    }

    /// Validate the subject and resolve arguments. The missing-`View` note
    /// is reported without stopping; anything else ends this role.
    fn arguments(
        &self,
        node: &AttributeSyntax,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
    ) -> Option<StylableArguments> {
        let subject = match decl {
            DeclSyntax::Type(ty)
                if matches!(ty.kind, NominalKind::Struct | NominalKind::Class | NominalKind::Enum) =>
            {
                ty.name.as_deref().map(|name| (ty, name))
            }
            _ => None,
        };
        let Some((ty, name)) = subject else {
            ctx.diagnose(node.range, StylableMacroError::InvalidDeclaration);
            return None;
        };

        if !ty.inherits(BASE_CAPABILITY) {
            ctx.diagnose(
                node.range,
                StylableMacroError::MissingViewConformance(name.to_string()),
            );
        }

        let factory = ArgumentFactory::new(node, name, decl.access_level());
        let args = ctx.report(node.range, factory.resolve())?;
        Some(StylableArguments {
            extended_type: ty.qualified_name().unwrap_or_else(|| name.to_string()),
            ..args
        })
    }
}

impl AttachedMacro for StylableMacro {
    fn peers(
        &self,
        node: &AttributeSyntax,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        let Some(args) = self.arguments(node, decl, ctx) else {
            return Vec::new();
        };
        vec![DeclarationFactory::new(&args, self.composition).style_protocol()]
    }

    fn extensions(
        &self,
        node: &AttributeSyntax,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        let Some(args) = self.arguments(node, decl, ctx) else {
            return Vec::new();
        };
        vec![DeclarationFactory::new(&args, self.composition).extension()]
    }
}
