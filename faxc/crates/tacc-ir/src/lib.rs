//! Three-address-code intermediate representation.
//!
//! Translates parsed expressions and statements into a flat TAC listing
//! using the jumping-code scheme: boolean expressions compile straight to
//! branches instead of materializing into a temporary first, and array
//! indexing lowers to explicit multiply/add offset arithmetic during
//! parsing (see `tacc-par`).

mod counters;
mod emit;
mod expr;
mod stmt;

pub use counters::Counters;
pub use emit::{emit, emit_jumps, emit_label};
pub use expr::{
    Access, ArithOp, Arithmetic, Constant, Expression, Identifier, Logic, LogicOp, Not, RelOp, Relation, Temp, Unary,
    UnaryOp,
};
pub use stmt::{Assign, AssignArray, Break, DoWhile, If, IfElse, LoopAfter, Statement, While};

/// Wraps a fully-parsed program body with the outer `begin`/`after` labels
/// and renders the whole thing as text, matching the top-level driver's
/// framing of the translation unit.
pub fn generate_program(body: &Statement, counters: &mut Counters) -> tacc_util::Result<String> {
    let mut buf = String::new();
    let begin = counters.new_label();
    let after = counters.new_label();
    emit_label(&mut buf, begin);
    body.generate(&mut buf, begin, after, counters)?;
    emit_label(&mut buf, after);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_is_just_the_begin_and_after_labels() {
        let mut counters = Counters::new();
        let out = generate_program(&Statement::Null, &mut counters).unwrap();
        assert_eq!(out, "L1:L2:");
    }
}
