//! Recursive-descent parser.
//!
//! One method per grammar production, each consuming `self.lookahead` and
//! calling `advance` to pull the next token. Expressions are parsed by
//! precedence climbing (`bool_expr` is loosest, `factor` tightest); every
//! production that builds a [`tacc_ir`] node goes through that node's
//! fallible constructor, so a type error surfaces at the point the
//! offending expression or statement is built rather than in some later
//! checking pass.

use std::io::Read;

use tacc_ir::{
    Access, ArithOp, Arithmetic, Assign, AssignArray, Break, Constant, DoWhile, Expression, Identifier, If, IfElse,
    Logic, LogicOp, LoopAfter, Not, RelOp, Relation, Statement, Unary, UnaryOp, While,
};
use tacc_lex::{Lexer, Token, Type};
use tacc_util::{Error, Result};

use crate::environment::Environment;

pub struct Parser<R: Read> {
    lexer: Lexer<R>,
    lookahead: Token,
    top: Environment,
    used: usize,
    /// The innermost loop currently being parsed, if any; `break` resolves
    /// against this and is rejected when it is `None`.
    enclosing_loop: Option<LoopAfter>,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Result<Parser<R>> {
        let mut lexer = Lexer::new(reader);
        let lookahead = lexer.scan()?;
        Ok(Parser {
            lexer,
            lookahead,
            top: Environment::default(),
            used: 0,
            enclosing_loop: None,
        })
    }

    /// Parses the whole program (a single top-level block) and renders it
    /// as a three-address-code listing.
    pub fn compile(&mut self) -> Result<String> {
        let body = self.block()?;
        let mut counters = tacc_ir::Counters::new();
        tacc_ir::generate_program(&body, &mut counters)
    }

    fn line(&self) -> usize {
        self.lexer.line
    }

    fn syntax_error(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.line(), message)
    }

    fn advance(&mut self) -> Result<()> {
        self.lookahead = self.lexer.scan()?;
        Ok(())
    }

    fn expect_char(&mut self, c: char) -> Result<()> {
        match self.lookahead {
            Token::Char(x) if x == c => self.advance(),
            _ => Err(self.syntax_error(format!("expected '{c}'"))),
        }
    }

    fn expect_token(&mut self, expected: &Token, what: &str) -> Result<()> {
        if &self.lookahead == expected {
            self.advance()
        } else {
            Err(self.syntax_error(format!("expected {what}")))
        }
    }

    fn expect_id(&mut self) -> Result<String> {
        match self.lookahead.clone() {
            Token::Id(name) => {
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.syntax_error("expected an identifier")),
        }
    }

    fn lookup(&self, name: &str, line: usize) -> Result<Identifier> {
        self.top
            .get(name)
            .cloned()
            .ok_or_else(|| Error::semantic(line, format!("{name} undeclared")))
    }

    // ---- declarations -----------------------------------------------

    /// `block = "{" decls stmts "}"`
    fn block(&mut self) -> Result<Statement> {
        self.expect_char('{')?;
        let parent = std::mem::take(&mut self.top);
        self.top = Environment::child_of(parent);
        self.decls()?;
        let body = self.stmts()?;
        // A recursive-descent grammar that reaches this point is always
        // sitting on the closing brace; consume it before popping scope.
        self.expect_char('}')?;
        let child = std::mem::take(&mut self.top);
        self.top = child.into_parent();
        Ok(body)
    }

    /// `decls = { type ID ";" }`
    fn decls(&mut self) -> Result<()> {
        while matches!(self.lookahead, Token::Type(_)) {
            let ty = self.typ()?;
            let name = self.expect_id()?;
            self.expect_char(';')?;
            let id = Identifier {
                name: name.clone(),
                ty: ty.clone(),
                offset: self.used,
            };
            self.used += ty.width();
            self.top.put(name, id);
        }
        Ok(())
    }

    /// `type = BASIC { dims }`
    fn typ(&mut self) -> Result<Type> {
        let base = match &self.lookahead {
            Token::Type(t) => t.clone(),
            _ => return Err(self.syntax_error("expected a type")),
        };
        self.advance()?;
        if self.lookahead == Token::Char('[') {
            self.dims(base)
        } else {
            Ok(base)
        }
    }

    /// `dims(of) = "[" NUM "]" [ dims ]`, building the innermost dimension
    /// first and wrapping it with each enclosing one on the way back out,
    /// so `int a[2][3]` is an array of 2 arrays of 3 ints.
    fn dims(&mut self, of: Type) -> Result<Type> {
        self.expect_char('[')?;
        let length = match self.lookahead {
            Token::Num(n) if n >= 0 => n as usize,
            _ => return Err(self.syntax_error("expected an array length")),
        };
        self.advance()?;
        self.expect_char(']')?;
        let of = if self.lookahead == Token::Char('[') {
            self.dims(of)?
        } else {
            of
        };
        Ok(Type::array(of, length))
    }

    // ---- statements ---------------------------------------------------

    /// `stmts = stmt stmts | ε`, stopping at the block's closing brace.
    fn stmts(&mut self) -> Result<Statement> {
        if self.lookahead == Token::Char('}') {
            return Ok(Statement::Null);
        }
        let head = self.stmt()?;
        let tail = self.stmts()?;
        Ok(Statement::seq(head, tail))
    }

    fn stmt(&mut self) -> Result<Statement> {
        match self.lookahead.clone() {
            Token::Char(';') => {
                self.advance()?;
                Ok(Statement::Null)
            }
            Token::Char('{') => self.block(),
            Token::If => self.if_stmt(),
            Token::While => self.while_stmt(),
            Token::Do => self.do_stmt(),
            Token::Break => self.break_stmt(),
            _ => self.assign(),
        }
    }

    fn if_stmt(&mut self) -> Result<Statement> {
        self.advance()?;
        self.expect_char('(')?;
        let cond = self.bool_expr()?;
        self.expect_char(')')?;
        let line = self.line();
        let body = self.stmt()?;
        if self.lookahead != Token::Else {
            return Ok(Statement::If(If::new(cond, body, line)?));
        }
        self.advance()?;
        let else_branch = self.stmt()?;
        Ok(Statement::IfElse(IfElse::new(cond, body, else_branch, line)?))
    }

    fn while_stmt(&mut self) -> Result<Statement> {
        let after = LoopAfter::new();
        let saved = self.enclosing_loop.replace(after.clone());
        self.advance()?;
        self.expect_char('(')?;
        let cond = self.bool_expr()?;
        let line = self.line();
        self.expect_char(')')?;
        let body = self.stmt()?;
        self.enclosing_loop = saved;
        Ok(Statement::While(While::new(cond, body, after, line)?))
    }

    fn do_stmt(&mut self) -> Result<Statement> {
        let after = LoopAfter::new();
        let saved = self.enclosing_loop.replace(after.clone());
        self.advance()?;
        let body = self.stmt()?;
        self.enclosing_loop = saved;
        self.expect_token(&Token::While, "'while'")?;
        self.expect_char('(')?;
        let cond = self.bool_expr()?;
        let line = self.line();
        self.expect_char(')')?;
        self.expect_char(';')?;
        Ok(Statement::DoWhile(DoWhile::new(cond, body, after, line)?))
    }

    fn break_stmt(&mut self) -> Result<Statement> {
        let line = self.line();
        self.advance()?;
        self.expect_char(';')?;
        match &self.enclosing_loop {
            Some(after) => Ok(Statement::Break(Break::new(after.clone()))),
            None => Err(Error::semantic(line, "break outside of an enclosing loop")),
        }
    }

    /// `assign = ID "=" bool ";" | ID offset "=" bool ";"`
    fn assign(&mut self) -> Result<Statement> {
        let line = self.line();
        let name = self.expect_id()?;
        let id = self.lookup(&name, line)?;
        let stmt = if self.lookahead == Token::Char('=') {
            self.advance()?;
            let expr = self.bool_expr()?;
            Statement::Assign(Assign::new(id, expr, line)?)
        } else {
            let access = self.offset(&id)?;
            self.expect_char('=')?;
            let expr = self.bool_expr()?;
            Statement::AssignArray(AssignArray::new(access.array, *access.index, access.ty, expr, line)?)
        };
        self.expect_char(';')?;
        Ok(stmt)
    }

    /// `offset(id) = "[" bool "]" { "[" bool "]" }`, lowering nested
    /// subscripts into running `index * elementWidth` / `+` arithmetic over
    /// the array's declared element widths.
    fn offset(&mut self, id: &Identifier) -> Result<Access> {
        let line = self.line();
        let mut current_ty = id.ty.clone();

        let peel = |ty: &Type, line: usize| -> Result<Type> {
            match ty {
                Type::Array(of, _) => Ok((**of).clone()),
                _ => Err(Error::semantic(line, "type error: not an array")),
            }
        };

        self.expect_char('[')?;
        let index = self.bool_expr()?;
        self.expect_char(']')?;
        let elem_ty = peel(&current_ty, line)?;
        let width = Expression::Constant(Constant::Int(elem_ty.width() as i64));
        let mut loc = Expression::Arithmetic(Arithmetic::new(ArithOp::Mul, index, width, line)?);
        current_ty = elem_ty;

        while self.lookahead == Token::Char('[') {
            self.advance()?;
            let index = self.bool_expr()?;
            self.expect_char(']')?;
            let elem_ty = peel(&current_ty, line)?;
            let width = Expression::Constant(Constant::Int(elem_ty.width() as i64));
            let step = Expression::Arithmetic(Arithmetic::new(ArithOp::Mul, index, width, line)?);
            loc = Expression::Arithmetic(Arithmetic::new(ArithOp::Add, loc, step, line)?);
            current_ty = elem_ty;
        }

        Ok(Access {
            array: id.clone(),
            index: Box::new(loc),
            ty: current_ty,
        })
    }

    // ---- expressions, loosest to tightest -----------------------------

    /// `bool = join { "||" join }`
    fn bool_expr(&mut self) -> Result<Expression> {
        let mut expr = self.join()?;
        while self.lookahead == Token::Or {
            self.advance()?;
            let line = self.line();
            let right = self.join()?;
            expr = Expression::Logic(Logic::new(LogicOp::Or, expr, right, line)?);
        }
        Ok(expr)
    }

    /// `join = equality { "&&" equality }`
    fn join(&mut self) -> Result<Expression> {
        let mut expr = self.equality()?;
        while self.lookahead == Token::And {
            self.advance()?;
            let line = self.line();
            let right = self.equality()?;
            expr = Expression::Logic(Logic::new(LogicOp::And, expr, right, line)?);
        }
        Ok(expr)
    }

    /// `equality = relation { ("==" | "!=") relation }`
    fn equality(&mut self) -> Result<Expression> {
        let mut expr = self.relation()?;
        loop {
            let op = match self.lookahead {
                Token::Eq => RelOp::Eq,
                Token::Ne => RelOp::Ne,
                _ => return Ok(expr),
            };
            self.advance()?;
            let line = self.line();
            let right = self.relation()?;
            expr = Expression::Relation(Relation::new(op, expr, right, line)?);
        }
    }

    /// `relation = additive [ ("<" | ">" | "<=" | ">=") additive ]`
    fn relation(&mut self) -> Result<Expression> {
        let expr = self.additive()?;
        let op = match self.lookahead {
            Token::Char('<') => RelOp::Lt,
            Token::Char('>') => RelOp::Gt,
            Token::Le => RelOp::Le,
            Token::Ge => RelOp::Ge,
            _ => return Ok(expr),
        };
        self.advance()?;
        let line = self.line();
        let right = self.additive()?;
        Ok(Expression::Relation(Relation::new(op, expr, right, line)?))
    }

    /// `additive = term { ("+" | "-") term }`
    fn additive(&mut self) -> Result<Expression> {
        let mut expr = self.term()?;
        loop {
            let op = match self.lookahead {
                Token::Char('+') => ArithOp::Add,
                Token::Char('-') => ArithOp::Sub,
                _ => return Ok(expr),
            };
            self.advance()?;
            let line = self.line();
            let right = self.term()?;
            expr = Expression::Arithmetic(Arithmetic::new(op, expr, right, line)?);
        }
    }

    /// `term = unary { ("*" | "/") unary }`
    fn term(&mut self) -> Result<Expression> {
        let mut expr = self.unary()?;
        loop {
            let op = match self.lookahead {
                Token::Char('*') => ArithOp::Mul,
                Token::Char('/') => ArithOp::Div,
                _ => return Ok(expr),
            };
            self.advance()?;
            let line = self.line();
            let right = self.unary()?;
            expr = Expression::Arithmetic(Arithmetic::new(op, expr, right, line)?);
        }
    }

    /// `unary = "-" unary | "!" unary | factor`
    fn unary(&mut self) -> Result<Expression> {
        if self.lookahead == Token::Char('-') {
            self.advance()?;
            let line = self.line();
            let rest = self.unary()?;
            return Ok(Expression::Unary(Unary::new(UnaryOp::Neg, rest, line)?));
        }
        if self.lookahead == Token::Char('!') {
            self.advance()?;
            let line = self.line();
            let rest = self.unary()?;
            return Ok(Expression::Not(Not::new(rest, line)?));
        }
        self.factor()
    }

    /// `factor = "(" bool ")" | NUM | REAL | "true" | "false" | ID [ offset ]`
    fn factor(&mut self) -> Result<Expression> {
        match self.lookahead.clone() {
            Token::Char('(') => {
                self.advance()?;
                let expr = self.bool_expr()?;
                self.expect_char(')')?;
                Ok(expr)
            }
            Token::Num(v) => {
                self.advance()?;
                Ok(Expression::Constant(Constant::Int(v)))
            }
            Token::Real(v) => {
                self.advance()?;
                Ok(Expression::Constant(Constant::Float(v)))
            }
            Token::True => {
                self.advance()?;
                Ok(Expression::Constant(Constant::True))
            }
            Token::False => {
                self.advance()?;
                Ok(Expression::Constant(Constant::False))
            }
            Token::Id(name) => {
                let line = self.line();
                let id = self.lookup(&name, line)?;
                self.advance()?;
                if self.lookahead != Token::Char('[') {
                    return Ok(Expression::Identifier(id));
                }
                Ok(Expression::Access(self.offset(&id)?))
            }
            _ => Err(self.syntax_error("expected an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> Result<String> {
        Parser::new(src.as_bytes())?.compile()
    }

    #[test]
    fn declares_and_assigns_a_scalar() {
        let out = compile("{ int i; i = 1; }").unwrap();
        assert!(out.contains("i = 1"));
    }

    #[test]
    fn undeclared_identifier_is_a_semantic_error() {
        let err = compile("{ i = 1; }").unwrap_err();
        assert!(matches!(err, Error::Semantic { .. }));
    }

    #[test]
    fn break_outside_a_loop_is_rejected() {
        let err = compile("{ break; }").unwrap_err();
        assert!(matches!(err, Error::Semantic { .. }));
    }

    #[test]
    fn break_inside_while_resolves_to_its_after_label() {
        let out = compile("{ bool done; while (done) { break; } }").unwrap();
        // the break's goto must target the same label the while's own
        // "falls out of the loop" edge targets.
        let while_exit = out
            .lines()
            .find(|l| l.contains("iffalse done goto"))
            .and_then(|l| l.rsplit('L').next())
            .unwrap();
        assert!(out.contains(&format!("goto L{while_exit}")));
    }

    #[test]
    fn nested_blocks_each_get_their_own_scope() {
        let out = compile("{ int i; i = 1; { int i; i = 2; } i = 3; }");
        assert!(out.is_ok());
    }

    #[test]
    fn two_dimensional_array_access_lowers_to_offset_arithmetic() {
        let out = compile("{ int a[2][3]; int i; int j; i = 0; j = 0; a[i][j] = 5; }").unwrap();
        assert!(out.contains("* 12"));
        assert!(out.contains("* 4"));
        assert!(out.contains(" + "));
    }

    #[test]
    fn if_else_condition_must_be_boolean() {
        let err = compile("{ int i; if (i) i = 1; }").unwrap_err();
        assert!(matches!(err, Error::Semantic { .. }));
    }

    #[test]
    fn operator_precedence_binds_multiplication_tighter_than_addition() {
        let out = compile("{ int x; int y; int z; x = 1; y = 2; z = 3; x = y + z * 2; }").unwrap();
        assert!(out.contains("z * 2"));
    }

    #[test]
    fn array_store_rejects_bool_rhs_for_numeric_element() {
        let err = compile("{ int[10] a; bool flag; flag = true; a[0] = flag; }").unwrap_err();
        assert!(matches!(err, Error::Semantic { .. }));
    }

    #[test]
    fn array_store_rejects_array_valued_rhs() {
        let err = compile("{ int[10] a; int[10] b; a[0] = b; }").unwrap_err();
        assert!(matches!(err, Error::Semantic { .. }));
    }
}
