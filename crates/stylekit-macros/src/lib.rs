//! # Stylekit Macros
//!
//! Procedural macros for Stylekit.
//!
//! `color!` is the Rust-side counterpart of the Swift `#color` macro: the
//! hex string is decoded while compiling, so a typo is a build error
//! instead of a runtime surprise.

extern crate proc_macro;

mod codegen;
mod parser;

use proc_macro::TokenStream;
use syn::parse_macro_input;

/// Compile-time checked color literal
///
/// Accepts `RRGGBB` or `RRGGBBAA`, with or without a leading `#`. A
/// missing alpha channel means fully opaque.
///
/// # Example
///
/// ```ignore
/// use stylekit::prelude::*;
///
/// const ACCENT: Color = color!("#ff8800");
/// let overlay = color!("00000080");
/// ```
///
/// Invalid input fails the build at the literal:
///
/// ```ignore
/// let oops = color!("#12345z"); // error: The hex "#12345z" contains invalid characters: z
/// ```
#[proc_macro]
pub fn color(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as parser::ColorInput);

    let generated = codegen::generate_color(&input);

    TokenStream::from(generated)
}
