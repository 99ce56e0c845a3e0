//! Expressions and the jumping-code translation scheme.
//!
//! Every variant supports three operations:
//!
//! - `generate` simplifies one level (recursively reducing operands) without
//!   forcing the result into a temporary.
//! - `reduce` calls `generate` and then always materializes the result into
//!   a fresh temporary, emitting the assignment.
//! - `jumps(to, from)` compiles a boolean-valued expression directly into
//!   branches instead of materializing it at all: `to` is the label to jump
//!   to when the expression is true, `from` the label to jump to when it is
//!   false, and 0 means "fall through" for either.
//!
//! Relational and logical expressions override `jumps` with short-circuit
//! control flow; every other expression falls back to evaluating itself as
//! a boolean test and handing it to [`emit_jumps`].

use std::fmt;

use tacc_lex::{max_type, Type};
use tacc_util::{Error, Result};

use crate::counters::Counters;
use crate::emit::{emit, emit_jumps, emit_label};

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    True,
    False,
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int(_) => Type::int(),
            Constant::Float(_) => Type::float(),
            Constant::True | Constant::False => Type::bool(),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{v}"),
            Constant::True => write!(f, "true"),
            Constant::False => write!(f, "false"),
        }
    }
}

/// A declared scalar or array variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub ty: Type,
    /// Byte offset within its scope's storage, assigned at declaration time.
    pub offset: usize,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Temp {
    pub ty: Type,
    pub number: usize,
}

impl Temp {
    pub fn new(ty: Type, counters: &mut Counters) -> Temp {
        Temp {
            ty,
            number: counters.new_temp(),
        }
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.number)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            ArithOp::Add => '+',
            ArithOp::Sub => '-',
            ArithOp::Mul => '*',
            ArithOp::Div => '/',
        };
        write!(f, "{c}")
    }
}

#[derive(Clone, Debug)]
pub struct Arithmetic {
    pub op: ArithOp,
    pub ty: Type,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    line: usize,
}

impl Arithmetic {
    pub fn new(op: ArithOp, left: Expression, right: Expression, line: usize) -> Result<Arithmetic> {
        let ty = max_type(&left.ty(), &right.ty())
            .ok_or_else(|| Error::semantic(line, "type error"))?;
        Ok(Arithmetic {
            op,
            ty,
            left: Box::new(left),
            right: Box::new(right),
            line,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minus")
    }
}

#[derive(Clone, Debug)]
pub struct Unary {
    pub op: UnaryOp,
    pub ty: Type,
    pub rest: Box<Expression>,
    line: usize,
}

impl Unary {
    pub fn new(op: UnaryOp, rest: Expression, line: usize) -> Result<Unary> {
        let ty = max_type(&Type::int(), &rest.ty()).ok_or_else(|| Error::semantic(line, "type error"))?;
        Ok(Unary {
            op,
            ty,
            rest: Box::new(rest),
            line,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Access {
    pub array: Identifier,
    pub index: Box<Expression>,
    pub ty: Type,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug)]
pub struct Relation {
    pub op: RelOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl Relation {
    pub fn new(op: RelOp, left: Expression, right: Expression, line: usize) -> Result<Relation> {
        if left.ty() != right.ty() {
            return Err(Error::semantic(line, "type error"));
        }
        if matches!(left.ty(), Type::Array(..)) || matches!(right.ty(), Type::Array(..)) {
            return Err(Error::semantic(line, "type error"));
        }
        Ok(Relation {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Not {
    pub expr: Box<Expression>,
}

impl Not {
    pub fn new(expr: Expression, line: usize) -> Result<Not> {
        if expr.ty() != Type::bool() {
            return Err(Error::semantic(line, "type error"));
        }
        Ok(Not { expr: Box::new(expr) })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Clone, Debug)]
pub struct Logic {
    pub op: LogicOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl Logic {
    pub fn new(op: LogicOp, left: Expression, right: Expression, line: usize) -> Result<Logic> {
        if left.ty() != Type::bool() || right.ty() != Type::bool() {
            return Err(Error::semantic(line, "type error"));
        }
        Ok(Logic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[derive(Clone, Debug)]
pub enum Expression {
    Constant(Constant),
    Identifier(Identifier),
    Temp(Temp),
    Arithmetic(Arithmetic),
    Unary(Unary),
    Access(Access),
    Relation(Relation),
    Not(Not),
    Logic(Logic),
}

impl Expression {
    pub fn ty(&self) -> Type {
        match self {
            Expression::Constant(c) => c.ty(),
            Expression::Identifier(id) => id.ty.clone(),
            Expression::Temp(t) => t.ty.clone(),
            Expression::Arithmetic(a) => a.ty.clone(),
            Expression::Unary(u) => u.ty.clone(),
            Expression::Access(a) => a.ty.clone(),
            Expression::Relation(_) | Expression::Not(_) | Expression::Logic(_) => Type::bool(),
        }
    }

    /// Simplifies one level, recursively reducing operands, but does not
    /// force the result into a temporary.
    pub fn generate(&self, buf: &mut String, counters: &mut Counters) -> Result<Expression> {
        match self {
            Expression::Constant(_) | Expression::Identifier(_) | Expression::Temp(_) => Ok(self.clone()),
            Expression::Arithmetic(a) => {
                let lr = a.left.reduce(buf, counters)?;
                let rr = a.right.reduce(buf, counters)?;
                Ok(Expression::Arithmetic(Arithmetic::new(a.op, lr, rr, a.line)?))
            }
            Expression::Unary(u) => {
                let r = u.rest.reduce(buf, counters)?;
                Ok(Expression::Unary(Unary::new(u.op, r, u.line)?))
            }
            Expression::Access(a) => {
                let idx = a.index.reduce(buf, counters)?;
                Ok(Expression::Access(Access {
                    array: a.array.clone(),
                    index: Box::new(idx),
                    ty: a.ty.clone(),
                }))
            }
            Expression::Relation(_) | Expression::Not(_) | Expression::Logic(_) => self.reduce(buf, counters),
        }
    }

    /// Always materializes the expression's value into a fresh temporary.
    pub fn reduce(&self, buf: &mut String, counters: &mut Counters) -> Result<Expression> {
        match self {
            Expression::Constant(_) | Expression::Identifier(_) | Expression::Temp(_) => Ok(self.clone()),
            Expression::Arithmetic(_) | Expression::Unary(_) | Expression::Access(_) => {
                let x = self.generate(buf, counters)?;
                let tmp = Temp::new(self.ty(), counters);
                emit(buf, &format!("{tmp} = {x}"));
                Ok(Expression::Temp(tmp))
            }
            Expression::Relation(r) => {
                let f = counters.new_label();
                let a = counters.new_label();
                let tmp = Temp::new(Type::bool(), counters);
                Expression::Relation(r.clone()).jumps(buf, 0, f, counters)?;
                emit(buf, &format!("{tmp} = true"));
                emit(buf, &format!("goto L{a}"));
                emit_label(buf, f);
                emit(buf, &format!("{tmp} = false"));
                emit_label(buf, a);
                Ok(Expression::Temp(tmp))
            }
            Expression::Not(n) => {
                let from = counters.new_label();
                let a = counters.new_label();
                let tmp = Temp::new(Type::bool(), counters);
                Expression::Not(n.clone()).jumps(buf, 0, from, counters)?;
                emit(buf, &format!("{tmp} = true"));
                emit(buf, &format!("goto L{a}"));
                emit_label(buf, from);
                emit(buf, &format!("{tmp} = false"));
                emit_label(buf, a);
                Ok(Expression::Temp(tmp))
            }
            Expression::Logic(l) => {
                let from = counters.new_label();
                let a = counters.new_label();
                let tmp = Temp::new(Type::bool(), counters);
                Expression::Logic(l.clone()).jumps(buf, 0, from, counters)?;
                emit(buf, &format!("{tmp} = true"));
                emit(buf, &format!("goto L{a}"));
                emit_label(buf, from);
                emit(buf, &format!("{tmp} = false"));
                emit_label(buf, a);
                Ok(Expression::Temp(tmp))
            }
        }
    }

    /// Compiles a boolean-valued expression into branches: jumps to `to`
    /// when true, to `from` when false (0 meaning fall through either way).
    pub fn jumps(&self, buf: &mut String, to: usize, from: usize, counters: &mut Counters) -> Result<()> {
        match self {
            Expression::Constant(Constant::True) => {
                if to != 0 {
                    emit(buf, &format!("goto L{to}"));
                }
                Ok(())
            }
            Expression::Constant(Constant::False) => {
                if from != 0 {
                    emit(buf, &format!("goto L{from}"));
                }
                Ok(())
            }
            Expression::Relation(r) => {
                let lr = r.left.reduce(buf, counters)?;
                let rr = r.right.reduce(buf, counters)?;
                emit_jumps(buf, &format!("{lr} {} {rr}", r.op), to, from);
                Ok(())
            }
            Expression::Not(n) => n.expr.jumps(buf, from, to, counters),
            Expression::Logic(l) if l.op == LogicOp::Or => {
                let label = if to == 0 { counters.new_label() } else { to };
                l.left.jumps(buf, label, 0, counters)?;
                l.right.jumps(buf, to, from, counters)?;
                if to == 0 {
                    emit_label(buf, label);
                }
                Ok(())
            }
            Expression::Logic(l) => {
                let label = if from == 0 { counters.new_label() } else { from };
                l.left.jumps(buf, 0, label, counters)?;
                l.right.jumps(buf, to, from, counters)?;
                if from == 0 {
                    emit_label(buf, label);
                }
                Ok(())
            }
            Expression::Access(_) => {
                let reduced = self.reduce(buf, counters)?;
                emit_jumps(buf, &reduced.to_string(), to, from);
                Ok(())
            }
            _ => {
                emit_jumps(buf, &self.to_string(), to, from);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(c) => write!(f, "{c}"),
            Expression::Identifier(id) => write!(f, "{id}"),
            Expression::Temp(t) => write!(f, "{t}"),
            Expression::Arithmetic(a) => write!(f, "{} {} {}", a.left, a.op, a.right),
            Expression::Unary(u) => write!(f, "{} {}", u.op, u.rest),
            Expression::Access(a) => write!(f, "{} [{}]", a.array, a.index),
            Expression::Relation(r) => write!(f, "{} {} {}", r.left, r.op, r.right),
            Expression::Not(n) => write!(f, "! {}", n.expr),
            Expression::Logic(l) => {
                let op = match l.op {
                    LogicOp::And => "&&",
                    LogicOp::Or => "||",
                };
                write!(f, "{} {op} {}", l.left, l.right)
            }
        }
    }
}
