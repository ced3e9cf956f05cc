//! # Stylekit
//!
//! Macro expansion for SwiftUI styling boilerplate, plus compile-time
//! checked colors for Rust code that shares a palette with it.
//!
//! ## Example
//!
//! ```rust
//! use stylekit::prelude::*;
//!
//! let source = "extension EnvironmentValues {\n    @EnvironmentValue var spacing = 8\n}\n";
//! let expansion = Expander::default().expand(source).unwrap();
//! assert!(!expansion.has_errors());
//! assert!(expansion.source.contains("struct EnvironmentKey_spacing: EnvironmentKey"));
//!
//! let accent: Color = color!("#ff8800");
//! assert_eq!(accent.to_hex(), "#ff8800ff");
//! ```

pub mod render;

pub use stylekit_core::{
    access, color, config, diagnostic, error, expand, macros, report, syntax,
};

pub use stylekit_core::{
    apply_edits, apply_fix_its, decode, AccessLevel, Color, ColorComponents, Config, DecodeError,
    Diagnostic, Error, Expander, Expansion, ExpansionReport, FixIt, MacroError, MacroRegistry,
    Result, Severity, Summary, TextEdit,
};

// Re-export procedural macros
pub use stylekit_macros::color;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Color, Config, Diagnostic, Expander, Expansion, Severity};
    pub use stylekit_macros::color;
}
