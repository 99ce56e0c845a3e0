//! Low-level text emission into the growing TAC listing.
//!
//! An instruction is always `\t<text>\n`; a label is always `L<n>:` with no
//! trailing newline, so it shares a line with whatever is emitted next.

use std::fmt::Write as _;

pub fn emit(buf: &mut String, text: &str) {
    let _ = writeln!(buf, "\t{text}");
}

pub fn emit_label(buf: &mut String, label: usize) {
    let _ = write!(buf, "L{label}:");
}

/// Shared by every [`crate::Expression`] variant's `jumps`: turns a boolean
/// test into branch instructions, emitting nothing when both targets are 0
/// (fall through).
pub fn emit_jumps(buf: &mut String, test: &str, to: usize, from: usize) {
    if to != 0 && from != 0 {
        emit(buf, &format!("if {test} goto L{to}"));
        emit(buf, &format!("goto L{from}"));
    } else if to != 0 {
        emit(buf, &format!("if {test} goto L{to}"));
    } else if from != 0 {
        emit(buf, &format!("iffalse {test} goto L{from}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_targets_emit_conditional_then_unconditional_jump() {
        let mut buf = String::new();
        emit_jumps(&mut buf, "x < y", 3, 4);
        assert_eq!(buf, "\tif x < y goto L3\n\tgoto L4\n");
    }

    #[test]
    fn only_to_emits_conditional_jump() {
        let mut buf = String::new();
        emit_jumps(&mut buf, "x < y", 3, 0);
        assert_eq!(buf, "\tif x < y goto L3\n");
    }

    #[test]
    fn only_from_emits_negated_jump() {
        let mut buf = String::new();
        emit_jumps(&mut buf, "x < y", 0, 4);
        assert_eq!(buf, "\tiffalse x < y goto L4\n");
    }

    #[test]
    fn no_targets_emits_nothing() {
        let mut buf = String::new();
        emit_jumps(&mut buf, "x < y", 0, 0);
        assert_eq!(buf, "");
    }

    #[test]
    fn label_has_no_trailing_newline() {
        let mut buf = String::new();
        emit_label(&mut buf, 7);
        emit(&mut buf, "goto L1");
        assert_eq!(buf, "L7:\tgoto L1\n");
    }
}
