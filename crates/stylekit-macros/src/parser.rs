//! Parser for `color!` input

use syn::parse::{Parse, ParseStream, Result};
use syn::{LitStr, Token};

/// `color!("#RRGGBB[AA]")`, with an optional trailing comma
pub struct ColorInput {
    pub literal: LitStr,
}

impl Parse for ColorInput {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Err(input.error("expected a hex string literal, e.g. color!(\"#ff8800\")"));
        }
        let literal: LitStr = input.parse()?;
        let _ = input.parse::<Option<Token![,]>>()?;
        if !input.is_empty() {
            return Err(input.error("color! takes a single string literal"));
        }
        Ok(ColorInput { literal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        let input: ColorInput = syn::parse_str("\"#ff8800\"").unwrap();
        assert_eq!(input.literal.value(), "#ff8800");

        let input: ColorInput = syn::parse_str("\"ff8800\",").unwrap();
        assert_eq!(input.literal.value(), "ff8800");
    }

    #[test]
    fn test_rejects_other_input() {
        assert!(syn::parse_str::<ColorInput>("").is_err());
        assert!(syn::parse_str::<ColorInput>("hex").is_err());
        assert!(syn::parse_str::<ColorInput>("\"fff\", \"000\"").is_err());
    }
}
