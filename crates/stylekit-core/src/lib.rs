//! # Stylekit Core
//!
//! Macro expansion engine for SwiftUI styling boilerplate.
//!
//! Swift sources annotated with `@EnvironmentValue`, `@FocusValue` and
//! `@Stylable`, or containing `#color("RRGGBB[AA]")` expressions, are
//! scanned, expanded, and written back as plain Swift. Misuse never aborts
//! a run; it is reported as a [`Diagnostic`] with optional fix-its.
//!
//! ```
//! use stylekit_core::Expander;
//!
//! let expansion = Expander::default()
//!     .expand("let tint = #color(\"ff8800\")")
//!     .unwrap();
//! assert!(expansion.source.starts_with("let tint = Color(red: 255 / 255"));
//! ```

pub mod access;
pub mod color;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod expand;
pub mod macros;
pub mod report;
pub mod syntax;

pub use access::AccessLevel;
pub use color::{decode, Color, ColorComponents, DecodeError};
pub use config::Config;
pub use diagnostic::{apply_edits, apply_fix_its, Diagnostic, FixIt, MacroError, Severity, TextEdit};
pub use error::{Error, Result};
pub use expand::{Expander, Expansion, MacroRegistry};
pub use report::{ExpansionReport, Summary};
