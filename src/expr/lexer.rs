//! Expression tokenizer
//!
//! One bracket-aware tokenizer feeds both array literals and call
//! arguments, so nesting (`f([1, 2], g(3, 4))`) never splits on the wrong
//! comma.

use unicode_ident::{is_xid_continue, is_xid_start};

use crate::error::ResolveError;

/// Token kind
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// Raw key following `Lang.`; may contain `-` and `.`
    LangKey(String),
    Int(i64),
    Float(f64),
    Str(String),

    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Tilde,
    FatArrow,

    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,

    Eof,
}

/// Token with its byte offset in the expression text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Expression lexer
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(
        &self,
        n: usize,
    ) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(
        &mut self,
        kind: TokenKind,
        offset: usize,
    ) {
        self.tokens.push(Token { kind, offset });
    }

    fn last_is_dot(&self) -> bool {
        matches!(self.tokens.last(), Some(Token { kind: TokenKind::Dot, .. }))
    }

    fn error(
        &self,
        ch: char,
        offset: usize,
    ) -> ResolveError {
        ResolveError::UnexpectedChar {
            ch,
            offset,
            source_text: self.source.to_string(),
        }
    }

    /// Tokenize the whole input, appending a trailing `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>, ResolveError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '"' => self.scan_string(start)?,
                '0'..='9' => self.scan_number(start, false)?,
                '-' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.bump();
                    self.scan_number(start, true)?;
                }
                c if c == '_' || is_xid_start(c) => self.scan_ident(start),
                _ => self.scan_symbol(c, start)?,
            }
        }
        let end = self.pos;
        self.push(TokenKind::Eof, end);
        Ok(self.tokens)
    }

    fn scan_string(
        &mut self,
        start: usize,
    ) -> Result<(), ResolveError> {
        self.bump();
        let body_start = self.pos;
        match self.source[body_start..].find('"') {
            Some(len) => {
                let text = self.source[body_start..body_start + len].to_string();
                self.pos = body_start + len + 1;
                self.push(TokenKind::Str(text), start);
                Ok(())
            }
            None => Err(ResolveError::UnterminatedString(self.source.to_string())),
        }
    }

    fn scan_number(
        &mut self,
        start: usize,
        negative: bool,
    ) -> Result<(), ResolveError> {
        // after a `.` only integer segments are allowed: `items.0.1`
        let allow_fraction = !self.last_is_dot();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_float = false;
        if allow_fraction
            && self.peek() == Some('.')
            && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.source[start..self.pos];
        let kind = if is_float {
            TokenKind::Float(text.parse().map_err(|_| self.error('.', start))?)
        } else {
            match text.parse::<i64>() {
                Ok(i) => TokenKind::Int(i),
                Err(_) => TokenKind::Float(
                    text.parse()
                        .map_err(|_| self.error(if negative { '-' } else { '0' }, start))?,
                ),
            }
        };
        self.push(kind, start);
        Ok(())
    }

    fn scan_ident(
        &mut self,
        start: usize,
    ) {
        while self.peek().is_some_and(|c| c == '_' || is_xid_continue(c)) {
            self.bump();
        }
        let name = &self.source[start..self.pos];
        if name == "Lang" && self.peek() == Some('.') && !self.last_is_dot() {
            self.bump();
            let key_start = self.pos;
            while self
                .peek()
                .is_some_and(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | ']' | '~'))
            {
                self.bump();
            }
            let key = self.source[key_start..self.pos].to_string();
            self.push(TokenKind::LangKey(key), start);
        } else {
            let name = name.to_string();
            self.push(TokenKind::Ident(name), start);
        }
    }

    fn scan_symbol(
        &mut self,
        c: char,
        start: usize,
    ) -> Result<(), ResolveError> {
        let rest = &self.source[self.pos..];
        let (kind, len) = if rest.starts_with("===") {
            (TokenKind::EqEqEq, 3)
        } else if rest.starts_with("!==") {
            (TokenKind::NotEqEq, 3)
        } else if rest.starts_with("==") {
            (TokenKind::EqEq, 2)
        } else if rest.starts_with("!=") {
            (TokenKind::NotEq, 2)
        } else if rest.starts_with("=>") {
            (TokenKind::FatArrow, 2)
        } else if rest.starts_with("<=") {
            (TokenKind::Le, 2)
        } else if rest.starts_with(">=") {
            (TokenKind::Ge, 2)
        } else if rest.starts_with("&&") {
            (TokenKind::AndAnd, 2)
        } else if rest.starts_with("||") {
            (TokenKind::OrOr, 2)
        } else {
            let kind = match c {
                '.' => TokenKind::Dot,
                ',' => TokenKind::Comma,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '~' => TokenKind::Tilde,
                '<' => TokenKind::Lt,
                '>' => TokenKind::Gt,
                '!' => TokenKind::Bang,
                _ => return Err(self.error(c, start)),
            };
            (kind, 1)
        };
        self.pos += len;
        self.push(kind, start);
        Ok(())
    }
}

/// Tokenize an expression string
pub fn tokenize(source: &str) -> Result<Vec<Token>, ResolveError> {
    Lexer::new(source).tokenize()
}
