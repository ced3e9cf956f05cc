use std::path::PathBuf;
use thiserror::Error;

use crate::syntax::LexError;

/// Failures outside of macro expansion itself. Macro misuse never ends up
/// here; it is reported as a [`Diagnostic`](crate::diagnostic::Diagnostic).
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at {0}")]
    Lex(#[from] LexError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
