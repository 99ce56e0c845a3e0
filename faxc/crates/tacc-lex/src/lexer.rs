//! Hand-written scanner, one byte of lookahead.
//!
//! The word table doubles as the keyword table: every keyword is inserted
//! before scanning starts, and every identifier seen for the first time is
//! interned into the same table so repeated uses of a name share one
//! [`Token::Id`] string.

use std::collections::HashMap;
use std::io::Read;

use tacc_util::Result;

use crate::token::{SimpleType, Token, Type};

/// Scans a byte stream into [`Token`]s.
pub struct Lexer<R> {
    reader: R,
    /// A byte pushed back after a failed two-character lookahead.
    pending: Option<char>,
    pub line: usize,
    words: HashMap<String, Token>,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        let mut words = HashMap::new();
        words.insert("if".to_string(), Token::If);
        words.insert("else".to_string(), Token::Else);
        words.insert("while".to_string(), Token::While);
        words.insert("do".to_string(), Token::Do);
        words.insert("break".to_string(), Token::Break);
        words.insert("true".to_string(), Token::True);
        words.insert("false".to_string(), Token::False);
        words.insert("int".to_string(), Token::Type(Type::Simple(SimpleType::Int)));
        words.insert("float".to_string(), Token::Type(Type::Simple(SimpleType::Float)));
        words.insert("char".to_string(), Token::Type(Type::Simple(SimpleType::Char)));
        words.insert("bool".to_string(), Token::Type(Type::Simple(SimpleType::Bool)));

        Lexer {
            reader,
            pending: None,
            line: 1,
            words,
        }
    }

    fn read(&mut self) -> Result<Option<char>> {
        if let Some(c) = self.pending.take() {
            return Ok(Some(c));
        }
        let mut buf = [0u8; 1];
        let n = self.reader.read(&mut buf)?;
        Ok(if n == 0 { None } else { Some(buf[0] as char) })
    }

    fn unread(&mut self, c: char) {
        self.pending = Some(c);
    }

    /// Scans and returns the next token, or [`Token::Eof`] once the input
    /// is exhausted. Safe to call again after returning `Eof`.
    pub fn scan(&mut self) -> Result<Token> {
        let mut c = loop {
            match self.read()? {
                None => return Ok(Token::Eof),
                Some(' ') | Some('\t') | Some('\r') => continue,
                Some('\n') => {
                    self.line += 1;
                    continue;
                }
                Some(ch) => break ch,
            }
        };

        macro_rules! two_char {
            ($second:expr, $yes:expr, $no:expr) => {{
                match self.read()? {
                    Some(n) if n == $second => return Ok($yes),
                    Some(n) => {
                        self.unread(n);
                        return Ok($no);
                    }
                    None => return Ok($no),
                }
            }};
        }

        match c {
            '&' => two_char!('&', Token::And, Token::Char('&')),
            '|' => two_char!('|', Token::Or, Token::Char('|')),
            '=' => two_char!('=', Token::Eq, Token::Char('=')),
            '!' => two_char!('=', Token::Ne, Token::Char('!')),
            '<' => two_char!('=', Token::Le, Token::Char('<')),
            '>' => two_char!('=', Token::Ge, Token::Char('>')),
            _ => {}
        }

        if c.is_ascii_digit() {
            let mut v: i64 = (c as u8 - b'0') as i64;
            loop {
                match self.read()? {
                    Some(d) if d.is_ascii_digit() => v = v * 10 + (d as u8 - b'0') as i64,
                    Some(other) => {
                        c = other;
                        break;
                    }
                    None => return Ok(Token::Num(v)),
                }
            }
            if c != '.' {
                self.unread(c);
                return Ok(Token::Num(v));
            }

            let mut x = v as f64;
            let mut d = 10.0_f64;
            loop {
                match self.read()? {
                    Some(dig) if dig.is_ascii_digit() => {
                        x += (dig as u8 - b'0') as f64 / d;
                        d *= 10.0;
                    }
                    Some(other) => {
                        self.unread(other);
                        break;
                    }
                    None => break,
                }
            }
            return Ok(Token::Real(x));
        }

        if c.is_ascii_alphabetic() {
            let mut s = String::new();
            s.push(c);
            loop {
                match self.read()? {
                    Some(n) if n.is_ascii_alphabetic() || n.is_ascii_digit() => s.push(n),
                    Some(other) => {
                        self.unread(other);
                        break;
                    }
                    None => break,
                }
            }
            if let Some(tok) = self.words.get(&s) {
                return Ok(tok.clone());
            }
            let tok = Token::Id(s.clone());
            self.words.insert(s, tok.clone());
            return Ok(tok);
        }

        Ok(Token::Char(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src.as_bytes());
        let mut out = Vec::new();
        loop {
            let tok = lexer.scan().unwrap();
            if tok == Token::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn test_keyword_if() {
        assert_eq!(scan_all("if"), vec![Token::If]);
    }

    #[test]
    fn test_keyword_else() {
        assert_eq!(scan_all("else"), vec![Token::Else]);
    }

    #[test]
    fn test_keyword_while() {
        assert_eq!(scan_all("while"), vec![Token::While]);
    }

    #[test]
    fn test_keyword_do() {
        assert_eq!(scan_all("do"), vec![Token::Do]);
    }

    #[test]
    fn test_keyword_break() {
        assert_eq!(scan_all("break"), vec![Token::Break]);
    }

    #[test]
    fn test_keyword_true() {
        assert_eq!(scan_all("true"), vec![Token::True]);
    }

    #[test]
    fn test_keyword_false() {
        assert_eq!(scan_all("false"), vec![Token::False]);
    }

    #[test]
    fn test_keyword_int() {
        assert_eq!(scan_all("int"), vec![Token::Type(Type::int())]);
    }

    #[test]
    fn test_keyword_float() {
        assert_eq!(scan_all("float"), vec![Token::Type(Type::float())]);
    }

    #[test]
    fn test_keyword_char() {
        assert_eq!(scan_all("char"), vec![Token::Type(Type::char())]);
    }

    #[test]
    fn test_keyword_bool() {
        assert_eq!(scan_all("bool"), vec![Token::Type(Type::bool())]);
    }

    #[test]
    fn identifier_is_not_a_keyword_prefix() {
        assert_eq!(scan_all("iffy"), vec![Token::Id("iffy".to_string())]);
    }

    #[test]
    fn repeated_identifier_scans_equal_tokens() {
        let toks = scan_all("count count");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0], toks[1]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            scan_all("&& || == != <= >="),
            vec![Token::And, Token::Or, Token::Eq, Token::Ne, Token::Le, Token::Ge]
        );
    }

    #[test]
    fn single_char_falls_back_when_lookahead_fails() {
        assert_eq!(scan_all("& a"), vec![Token::Char('&'), Token::Id("a".to_string())]);
    }

    #[test]
    fn integer_literal() {
        assert_eq!(scan_all("1234"), vec![Token::Num(1234)]);
    }

    #[test]
    fn real_literal() {
        match scan_all("3.14").as_slice() {
            [Token::Real(v)] => assert!((v - 3.14).abs() < 1e-9),
            other => panic!("unexpected tokens: {other:?}"),
        }
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let mut lexer = Lexer::new("a\nb\nc".as_bytes());
        assert_eq!(lexer.scan().unwrap(), Token::Id("a".to_string()));
        assert_eq!(lexer.line, 2);
        assert_eq!(lexer.scan().unwrap(), Token::Id("b".to_string()));
        assert_eq!(lexer.line, 3);
        assert_eq!(lexer.scan().unwrap(), Token::Id("c".to_string()));
    }

    #[test]
    fn scan_is_stable_past_eof() {
        let mut lexer = Lexer::new("a".as_bytes());
        assert_eq!(lexer.scan().unwrap(), Token::Id("a".to_string()));
        assert_eq!(lexer.scan().unwrap(), Token::Eof);
        assert_eq!(lexer.scan().unwrap(), Token::Eof);
    }
}
