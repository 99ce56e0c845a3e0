//! Statements.
//!
//! Every statement's `generate` takes a `begin` label (where control enters
//! it) and an `after` label (where control should end up once it
//! completes); most leaf statements ignore `begin`, matching the original
//! design.
//!
//! `break` cannot be resolved purely bottom-up: its target is the *after*
//! label of its enclosing loop, which isn't known until that loop's own
//! `generate` runs. [`LoopAfter`] is a shared cell created when the parser
//! enters a loop body (before the body, and any `break` inside it, has been
//! parsed) and written to once, at the top of the loop's `generate`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tacc_util::{Error, Result};

use crate::counters::Counters;
use crate::emit::{emit, emit_label};
use crate::expr::{Expression, Identifier};

#[derive(Clone, Debug, Default)]
pub struct LoopAfter(Rc<Cell<usize>>);

impl LoopAfter {
    pub fn new() -> Self {
        LoopAfter(Rc::new(Cell::new(0)))
    }

    fn set(&self, value: usize) {
        self.0.set(value);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

#[derive(Clone, Debug)]
pub struct Assign {
    pub id: Identifier,
    pub expr: Expression,
}

impl Assign {
    pub fn new(id: Identifier, expr: Expression, line: usize) -> Result<Assign> {
        let id_numeric = id.ty.numeric();
        let expr_numeric = expr.ty().numeric();
        if id_numeric != expr_numeric {
            return Err(Error::semantic(line, "type error"));
        }
        let id_bool = id.ty == tacc_lex::Type::bool();
        let expr_bool = expr.ty() == tacc_lex::Type::bool();
        if id_bool != expr_bool {
            return Err(Error::semantic(line, "type error"));
        }
        Ok(Assign { id, expr })
    }

    fn generate(&self, buf: &mut String, counters: &mut Counters) -> Result<()> {
        let rhs = self.expr.generate(buf, counters)?;
        emit(buf, &format!("{} = {rhs}", self.id));
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct AssignArray {
    pub array: Identifier,
    pub index: Expression,
    pub expr: Expression,
}

impl AssignArray {
    /// Builds an array-element assignment from an already-constructed
    /// [`crate::expr::Access`] (the parser lowers `a[i] = e` by first
    /// building the access on the left, then moving its pieces here).
    ///
    /// `elem_ty` is the access's element type (`access.ty`), checked against
    /// `expr` the same way [`Assign::new`] checks a scalar assignment: both
    /// sides must agree on the numeric/bool partition, and neither side may
    /// be an array type.
    pub fn new(array: Identifier, index: Expression, elem_ty: tacc_lex::Type, expr: Expression, line: usize) -> Result<AssignArray> {
        if matches!(elem_ty, tacc_lex::Type::Array(..)) || matches!(expr.ty(), tacc_lex::Type::Array(..)) {
            return Err(Error::semantic(line, "type error"));
        }
        let elem_numeric = elem_ty.numeric();
        let expr_numeric = expr.ty().numeric();
        if elem_numeric != expr_numeric {
            return Err(Error::semantic(line, "type error"));
        }
        let elem_bool = elem_ty == tacc_lex::Type::bool();
        let expr_bool = expr.ty() == tacc_lex::Type::bool();
        if elem_bool != expr_bool {
            return Err(Error::semantic(line, "type error"));
        }
        Ok(AssignArray { array, index, expr })
    }

    fn generate(&self, buf: &mut String, counters: &mut Counters) -> Result<()> {
        let idx = self.index.reduce(buf, counters)?;
        let ex = self.expr.reduce(buf, counters)?;
        emit(buf, &format!("{} [ {idx} ] = {ex}", self.array));
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct If {
    pub cond: Expression,
    pub body: Box<Statement>,
}

impl If {
    pub fn new(cond: Expression, body: Statement, line: usize) -> Result<If> {
        if cond.ty() != tacc_lex::Type::bool() {
            return Err(Error::semantic(line, "boolean required in if"));
        }
        Ok(If {
            cond,
            body: Box::new(body),
        })
    }

    fn generate(&self, buf: &mut String, after: usize, counters: &mut Counters) -> Result<()> {
        let label = counters.new_label();
        self.cond.jumps(buf, 0, after, counters)?;
        emit_label(buf, label);
        self.body.generate(buf, label, after, counters)
    }
}

#[derive(Clone, Debug)]
pub struct IfElse {
    pub cond: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Box<Statement>,
}

impl IfElse {
    pub fn new(cond: Expression, then_branch: Statement, else_branch: Statement, line: usize) -> Result<IfElse> {
        if cond.ty() != tacc_lex::Type::bool() {
            return Err(Error::semantic(line, "boolean required in if"));
        }
        Ok(IfElse {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn generate(&self, buf: &mut String, after: usize, counters: &mut Counters) -> Result<()> {
        let label1 = counters.new_label();
        let label2 = counters.new_label();
        self.cond.jumps(buf, 0, label2, counters)?;
        emit_label(buf, label1);
        self.then_branch.generate(buf, label1, after, counters)?;
        emit(buf, &format!("goto L{after}"));
        emit_label(buf, label2);
        self.else_branch.generate(buf, label2, after, counters)
    }
}

#[derive(Clone, Debug)]
pub struct While {
    pub cond: Expression,
    pub body: Box<Statement>,
    pub after: LoopAfter,
}

impl While {
    pub fn new(cond: Expression, body: Statement, after: LoopAfter, line: usize) -> Result<While> {
        if cond.ty() != tacc_lex::Type::bool() {
            return Err(Error::semantic(line, "boolean required in while loop"));
        }
        Ok(While {
            cond,
            body: Box::new(body),
            after,
        })
    }

    fn generate(&self, buf: &mut String, begin: usize, after: usize, counters: &mut Counters) -> Result<()> {
        self.after.set(after);
        self.cond.jumps(buf, 0, after, counters)?;
        let label = counters.new_label();
        emit_label(buf, label);
        self.body.generate(buf, label, begin, counters)?;
        emit(buf, &format!("goto L{begin}"));
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct DoWhile {
    pub cond: Expression,
    pub body: Box<Statement>,
    pub after: LoopAfter,
}

impl DoWhile {
    pub fn new(cond: Expression, body: Statement, after: LoopAfter, line: usize) -> Result<DoWhile> {
        if cond.ty() != tacc_lex::Type::bool() {
            return Err(Error::semantic(line, "boolean required in do loop"));
        }
        Ok(DoWhile {
            cond,
            body: Box::new(body),
            after,
        })
    }

    fn generate(&self, buf: &mut String, begin: usize, after: usize, counters: &mut Counters) -> Result<()> {
        self.after.set(after);
        let label = counters.new_label();
        self.body.generate(buf, begin, label, counters)?;
        emit_label(buf, label);
        self.cond.jumps(buf, begin, 0, counters)
    }
}

#[derive(Clone, Debug)]
pub struct Break {
    pub after: LoopAfter,
}

impl Break {
    /// `enclosing` is the `LoopAfter` cell of the loop this `break` sits
    /// inside. The caller is responsible for rejecting a `break` with no
    /// enclosing loop before ever reaching this constructor.
    pub fn new(enclosing: LoopAfter) -> Break {
        Break { after: enclosing }
    }

    fn generate(&self, buf: &mut String) {
        emit(buf, &format!("goto L{}", self.after.get()));
    }
}

#[derive(Clone, Debug)]
pub enum Statement {
    Null,
    Assign(Assign),
    AssignArray(AssignArray),
    Seq(Box<Statement>, Box<Statement>),
    If(If),
    IfElse(IfElse),
    While(While),
    DoWhile(DoWhile),
    Break(Break),
}

impl Statement {
    pub fn seq(head: Statement, tail: Statement) -> Statement {
        Statement::Seq(Box::new(head), Box::new(tail))
    }

    pub fn generate(&self, buf: &mut String, begin: usize, after: usize, counters: &mut Counters) -> Result<()> {
        match self {
            Statement::Null => Ok(()),
            Statement::Assign(a) => a.generate(buf, counters),
            Statement::AssignArray(a) => a.generate(buf, counters),
            Statement::Seq(head, tail) => {
                if matches!(**head, Statement::Null) {
                    return tail.generate(buf, begin, after, counters);
                }
                if matches!(**tail, Statement::Null) {
                    return head.generate(buf, begin, after, counters);
                }
                let label = counters.new_label();
                head.generate(buf, begin, label, counters)?;
                emit_label(buf, label);
                tail.generate(buf, label, after, counters)
            }
            Statement::If(i) => i.generate(buf, after, counters),
            Statement::IfElse(e) => e.generate(buf, after, counters),
            Statement::While(w) => w.generate(buf, begin, after, counters),
            Statement::DoWhile(d) => d.generate(buf, begin, after, counters),
            Statement::Break(b) => {
                b.generate(buf);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Constant;

    fn bool_id(name: &str) -> Expression {
        Expression::Identifier(Identifier {
            name: name.to_string(),
            ty: tacc_lex::Type::bool(),
            offset: 0,
        })
    }

    #[test]
    fn seq_with_null_head_skips_label_allocation() {
        let mut counters = Counters::new();
        let mut buf = String::new();
        let id = Identifier {
            name: "i".to_string(),
            ty: tacc_lex::Type::int(),
            offset: 0,
        };
        let assign = Statement::Assign(Assign::new(id, Expression::Constant(Constant::Int(1)), 1).unwrap());
        let seq = Statement::seq(Statement::Null, assign);
        seq.generate(&mut buf, 1, 2, &mut counters).unwrap();
        assert_eq!(buf, "\ti = 1\n");
        assert_eq!(counters.new_label(), 1);
    }

    #[test]
    fn break_emits_goto_enclosing_after_once_loop_generate_has_run() {
        let mut counters = Counters::new();
        let mut buf = String::new();
        let after = LoopAfter::new();
        let body = Statement::Break(Break::new(after.clone()));
        let while_stmt = While::new(bool_id("running"), body, after, 1).unwrap();
        Statement::While(while_stmt).generate(&mut buf, 1, 99, &mut counters).unwrap();
        assert!(buf.contains("goto L99"));
    }

    #[test]
    fn if_else_emits_unconditional_jump_past_the_true_branch() {
        let mut counters = Counters::new();
        let mut buf = String::new();
        let if_else = IfElse::new(bool_id("flag"), Statement::Null, Statement::Null, 1).unwrap();
        Statement::IfElse(if_else).generate(&mut buf, 1, 10, &mut counters).unwrap();
        assert!(buf.contains("goto L10"));
    }
}
