//! Lexical analysis: turns a byte stream into a sequence of [`Token`]s.
//!
//! The scanner is table-free and hand-written: a single [`Lexer::scan`]
//! call consumes whitespace, recognizes the handful of two-character
//! operators by one byte of lookahead, and otherwise dispatches on the
//! first character of the lexeme. Keywords and basic types share one word
//! table with identifiers, so a name is only ever allocated once.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{max_type, SimpleType, Token, Type};
