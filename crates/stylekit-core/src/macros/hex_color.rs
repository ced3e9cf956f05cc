use thiserror::Error;

use super::{ExpansionContext, ExpressionMacro};
use crate::color::{decode, ColorComponents, DecodeError};
use crate::diagnostic::MacroError;
use crate::syntax::FreestandingSyntax;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexColorMacroError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("The macro requires a hex string literal, e.g. #color(\"ff8800\")")]
    MissingHex,
}

impl MacroError for HexColorMacroError {
    fn id(&self) -> &'static str {
        match self {
            HexColorMacroError::Decode(DecodeError::InvalidCharacters { .. }) => "invalidCharacters",
            HexColorMacroError::Decode(DecodeError::InvalidLength { .. }) => "invalidLength",
            HexColorMacroError::Decode(DecodeError::DecodingFailed { .. }) => "decodingFailed",
            HexColorMacroError::MissingHex => "missingHex",
        }
    }
}

/// `#color("RRGGBB[AA]")`, checked at expansion time
#[derive(Debug, Clone)]
pub struct HexColorMacro {
    /// Type constructed by the expansion
    pub color_type: String,
}

impl Default for HexColorMacro {
    fn default() -> Self {
        HexColorMacro {
            color_type: "Color".to_string(),
        }
    }
}

impl HexColorMacro {
    pub fn new(color_type: impl Into<String>) -> Self {
        HexColorMacro {
            color_type: color_type.into(),
        }
    }

    pub fn decode_argument(node: &FreestandingSyntax) -> Result<ColorComponents, HexColorMacroError> {
        let hex = node
            .arguments
            .first()
            .and_then(|arg| arg.value.string_literal.as_deref())
            .ok_or(HexColorMacroError::MissingHex)?;
        Ok(decode(hex)?)
    }

    /// Construction expression with every channel written as `value / 255`
    pub fn construction(&self, components: ColorComponents) -> String {
        let ColorComponents {
            red,
            green,
            blue,
            opacity,
        } = components;
        format!(
            "{}(red: {red} / 255, green: {green} / 255, blue: {blue} / 255, opacity: {opacity} / 255)",
            self.color_type
        )
    }
}

impl ExpressionMacro for HexColorMacro {
    fn expand(&self, node: &FreestandingSyntax, ctx: &mut ExpansionContext<'_>) -> Option<String> {
        let components = ctx.report(node.range, Self::decode_argument(node))?;
        Some(self.construction(components))
    }
}
