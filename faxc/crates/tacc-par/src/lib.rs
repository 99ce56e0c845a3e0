//! Recursive-descent parser over a lexical scope chain.
//!
//! [`Parser::compile`] is the single entry point: it parses a whole
//! program as one top-level block and renders the parsed statement tree
//! straight to three-address code via `tacc-ir`. There is no separate AST
//! stage — each production builds its `tacc_ir` node directly, so a type
//! error is reported at the point the offending node is constructed.

mod environment;
mod parser;

pub use environment::Environment;
pub use parser::Parser;
