//! Translation error type.
//!
//! Internally distinguishes I/O, syntax, and static-semantic failures, but all
//! of them surface to the caller as the same [`Error`] enum: a message plus,
//! for parser/lexer-originated errors, the source line at which it occurred.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// A single translation error.
///
/// There is no recovery: the first error encountered aborts the translation,
/// so only the failing line and a description are kept.
#[derive(Debug, Error)]
pub enum Error {
    /// Failure reading from the input source.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected token, malformed array dimension, malformed `factor`, etc.
    #[error("line {line}: syntax error: {message}")]
    Syntax { line: usize, message: String },

    /// Undeclared identifier, type mismatch, `break` outside a loop, etc.
    #[error("line {line}: {message}")]
    Semantic { line: usize, message: String },
}

impl Error {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn semantic(line: usize, message: impl Into<String>) -> Self {
        Error::Semantic {
            line,
            message: message.into(),
        }
    }

    /// The source line this error was reported at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Io(_) => None,
            Error::Syntax { line, .. } | Error::Semantic { line, .. } => Some(*line),
        }
    }
}
