//! Code generation for `color!`

use crate::parser::ColorInput;
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use stylekit_core::{decode, ColorComponents};

/// Expand to a `::stylekit::Color` construction, or a `compile_error!` at
/// the literal when it does not decode
pub fn generate_color(input: &ColorInput) -> TokenStream {
    match decode(&input.literal.value()) {
        Ok(components) => construction(components),
        Err(err) => syn::Error::new(input.literal.span(), err).to_compile_error(),
    }
}

/// Each channel is written as `value / 255.0` so the expression stays a
/// constant
fn construction(components: ColorComponents) -> TokenStream {
    let ColorComponents {
        red,
        green,
        blue,
        opacity,
    } = components;
    let [red, green, blue, opacity] =
        [red, green, blue, opacity].map(|channel| Literal::f64_unsuffixed(f64::from(channel)));

    quote! {
        ::stylekit::Color::new(
            #red / 255.0,
            #green / 255.0,
            #blue / 255.0,
            #opacity / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generate(source: &str) -> String {
        let input: ColorInput = syn::parse_str(source).unwrap();
        generate_color(&input).to_string()
    }

    #[test]
    fn test_generates_constant_construction() {
        let expected = quote! {
            ::stylekit::Color::new(103.0 / 255.0, 108.0 / 255.0, 96.0 / 255.0, 128.0 / 255.0,)
        };
        assert_eq!(generate("\"#676C6080\""), expected.to_string());
    }

    #[test]
    fn test_opacity_defaults_to_opaque() {
        assert!(generate("\"000000\"").contains("255.0 / 255.0"));
    }

    #[test]
    fn test_invalid_hex_becomes_compile_error() {
        let output = generate("\"#12345z\"");
        assert!(output.contains("compile_error"));
        assert!(output.contains("contains invalid characters: z"));

        let output = generate("\"fff\"");
        assert!(output.contains("compile_error"));
    }
}
