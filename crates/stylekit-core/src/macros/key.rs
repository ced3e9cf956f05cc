//! `@EnvironmentValue` and `@FocusValue`
//!
//! Both turn a stored property into a computed one backed by a generated
//! key type named `<KeyProtocol>_<property>`:
//!
//! ```swift
//! extension EnvironmentValues {
//!     @EnvironmentValue var navigationTitle = "Home"
//! }
//! ```
//!
//! expands to a peer `struct EnvironmentKey_navigationTitle: EnvironmentKey`
//! holding the default value, plus `get`/`set` accessors that subscript
//! `self` with that key.

use thiserror::Error;

use super::{braced, AttachedMacro, ExpansionContext};
use crate::diagnostic::{FixIt, MacroError, TextEdit, WithFixIts};
use crate::syntax::{AttributeSyntax, DeclSyntax, Mutability, PatternBinding};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyMacroError {
    #[error("The macro can only be applied to a property with a single binding")]
    InvalidDeclaration,

    #[error("The macro can only be applied to a 'var' property")]
    InvalidPropertyType,

    #[error("The property '{name}' must have a default value")]
    MissingDefaultValue { name: String },

    #[error("The property '{name}' must declare an explicit optional type")]
    MissingTypeAnnotation { name: String },

    #[error("The type '{type_name}' of '{name}' must be optional")]
    InvalidOptionalTypeAnnotation { name: String, type_name: String },
}

impl MacroError for KeyMacroError {
    fn id(&self) -> &'static str {
        match self {
            KeyMacroError::InvalidDeclaration => "invalidDeclaration",
            KeyMacroError::InvalidPropertyType => "invalidPropertyType",
            KeyMacroError::MissingDefaultValue { .. } => "missingDefaultValue",
            KeyMacroError::MissingTypeAnnotation { .. } => "missingTypeAnnotation",
            KeyMacroError::InvalidOptionalTypeAnnotation { .. } => "invalidOptionalTypeAnnotation",
        }
    }
}

type KeyResult<T> = Result<T, WithFixIts<KeyMacroError>>;

/// The single `var` binding a key macro is attached to
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding<'a> {
    pub name: &'a str,
    pub binding: &'a PatternBinding,
}

impl<'a> KeyBinding<'a> {
    pub fn extract(decl: &'a DeclSyntax) -> KeyResult<Self> {
        let DeclSyntax::Variable(var) = decl else {
            return Err(KeyMacroError::InvalidDeclaration.into());
        };

        if var.mutability == Mutability::Let {
            let fix_it = FixIt::new(
                "replace-let-with-var",
                "Replace 'let' with 'var'",
                vec![TextEdit::replace(var.keyword_range, "var")],
            );
            return Err(KeyMacroError::InvalidPropertyType.with_fix_it(fix_it));
        }

        let [binding] = var.bindings.as_slice() else {
            return Err(KeyMacroError::InvalidDeclaration.into());
        };
        let name = binding
            .name
            .as_deref()
            .ok_or(KeyMacroError::InvalidDeclaration)?;

        Ok(KeyBinding { name, binding })
    }
}

/// Shared behaviour of the key-backed property macros
pub trait KeyMacro {
    /// Protocol the generated key type conforms to
    const KEY_PROTOCOL: &'static str;

    /// Members of the generated key type
    fn key_members(binding: &KeyBinding<'_>) -> KeyResult<Vec<String>>;

    fn key_name(property: &str) -> String {
        format!("{}_{}", Self::KEY_PROTOCOL, property)
    }
}

impl<M: KeyMacro> AttachedMacro for M {
    fn peers(
        &self,
        node: &AttributeSyntax,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        let result = KeyBinding::extract(decl).and_then(|binding| {
            let members = M::key_members(&binding)?;
            let header = format!("struct {}: {}", M::key_name(binding.name), M::KEY_PROTOCOL);
            Ok(braced(&header, &members))
        });
        ctx.report(node.range, result).into_iter().collect()
    }

    fn accessors(
        &self,
        node: &AttributeSyntax,
        decl: &DeclSyntax,
        ctx: &mut ExpansionContext<'_>,
    ) -> Vec<String> {
        let Some(binding) = ctx.report(node.range, KeyBinding::extract(decl)) else {
            return Vec::new();
        };
        let key = M::key_name(binding.name);
        vec![
            braced("get", &[format!("self[{key}.self]")]),
            braced("set", &[format!("self[{key}.self] = newValue")]),
        ]
    }

    /// `<Key>.Value`, the type the key infers from the default value
    fn accessor_type(&self, _node: &AttributeSyntax, decl: &DeclSyntax) -> Option<String> {
        let binding = KeyBinding::extract(decl).ok()?;
        binding
            .binding
            .type_annotation
            .is_none()
            .then(|| format!("{}.Value", M::key_name(binding.name)))
    }
}

/// `@EnvironmentValue`: the initializer becomes the key's `defaultValue`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentKeyMacro;

impl KeyMacro for EnvironmentKeyMacro {
    const KEY_PROTOCOL: &'static str = "EnvironmentKey";

    fn key_members(binding: &KeyBinding<'_>) -> KeyResult<Vec<String>> {
        let initializer =
            binding
                .binding
                .initializer
                .as_ref()
                .ok_or_else(|| KeyMacroError::MissingDefaultValue {
                    name: binding.name.to_string(),
                })?;
        let member = match &binding.binding.type_annotation {
            Some(ty) => format!("static let defaultValue: {} = {}", ty.text, initializer.text),
            None => format!("static let defaultValue = {}", initializer.text),
        };
        Ok(vec![member])
    }
}

/// `@FocusValue`: the optional type's wrapped type becomes the key's `Value`
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusedValueMacro;

impl KeyMacro for FocusedValueMacro {
    const KEY_PROTOCOL: &'static str = "FocusedValueKey";

    fn key_members(binding: &KeyBinding<'_>) -> KeyResult<Vec<String>> {
        let ty = binding.binding.type_annotation.as_ref().ok_or_else(|| {
            KeyMacroError::MissingTypeAnnotation {
                name: binding.name.to_string(),
            }
        })?;

        let Some(wrapped) = ty.optional_wrapped() else {
            let optional = ty.made_optional();
            let fix_it = FixIt::new(
                "make-optional",
                format!("Replace '{}' with '{}'", ty.text, optional),
                vec![TextEdit::replace(ty.range, optional.clone())],
            );
            let error = KeyMacroError::InvalidOptionalTypeAnnotation {
                name: binding.name.to_string(),
                type_name: ty.text.clone(),
            };
            return Err(error.with_fix_it(fix_it));
        };

        Ok(vec![format!("typealias Value = {wrapped}")])
    }
}
