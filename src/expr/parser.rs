//! Recursive-descent expression parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! list      := concat ("," concat)*
//! concat    := operand ("~" operand)*
//! operand   := STRING | NUMBER | "true" | "false"
//!            | "[" (item ("," item)* ","?)? "]"
//!            | "(" list ")"
//!            | LANGKEY args?
//!            | path
//! item      := concat ("=>" concat)?
//! path      := segment ("." segment)*
//! segment   := (IDENT | INT) args?
//! args      := "(" (concat ("," concat)*)? ")"
//!
//! condition := and (("or" | "||") and)*
//! and       := not (("and" | "&&") not)*
//! not       := ("not" | "!") not | "(" condition ")" ("~" operand)* (OP concat)? | compare
//! compare   := concat (OP concat)?
//! ```

use super::ast::*;
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::ResolveError;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ResolveError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    /// Parse a full expression and require end of input
    pub fn parse_expression(mut self) -> Result<Expr, ResolveError> {
        if self.check(&TokenKind::Eof) {
            return Ok(Expr::empty());
        }
        let expr = self.parse_list()?;
        self.expect(&TokenKind::Eof, "end of expression")?;
        Ok(expr)
    }

    /// Parse an `IF` condition and require end of input
    pub fn parse_condition(mut self) -> Result<Condition, ResolveError> {
        let cond = self.parse_or()?;
        self.expect(&TokenKind::Eof, "end of condition")?;
        Ok(cond)
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    fn parse_or(&mut self) -> Result<Condition, ResolveError> {
        let mut lhs = self.parse_and()?;
        while self.eat_word("or") || self.eat(&TokenKind::OrOr) {
            let rhs = self.parse_and()?;
            lhs = Condition::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Condition, ResolveError> {
        let mut lhs = self.parse_not()?;
        while self.eat_word("and") || self.eat(&TokenKind::AndAnd) {
            let rhs = self.parse_not()?;
            lhs = Condition::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Condition, ResolveError> {
        if self.eat_word("not") || self.eat(&TokenKind::Bang) {
            let inner = self.parse_not()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        if self.eat(&TokenKind::LParen) {
            let inner = self.parse_or()?;
            self.expect(&TokenKind::RParen, "')'")?;
            // `(a) == 1`, `("x" ~ y) ~ z`: the group was an operand
            return match inner {
                Condition::Value(expr)
                    if self.check(&TokenKind::Tilde) || self.compare_op().is_some() =>
                {
                    let lhs = self.concat_tail(expr)?;
                    self.compare_tail(lhs)
                }
                other => Ok(other),
            };
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Condition, ResolveError> {
        let lhs = self.parse_concat()?;
        self.compare_tail(lhs)
    }

    fn compare_tail(
        &mut self,
        lhs: Expr,
    ) -> Result<Condition, ResolveError> {
        let Some(op) = self.compare_op() else {
            return Ok(Condition::Value(lhs));
        };
        self.advance();
        let rhs = self.parse_concat()?;
        Ok(Condition::Compare { op, lhs, rhs })
    }

    fn compare_op(&self) -> Option<CompareOp> {
        match self.current() {
            TokenKind::EqEq => Some(CompareOp::Eq),
            TokenKind::NotEq => Some(CompareOp::NotEq),
            TokenKind::EqEqEq => Some(CompareOp::Identical),
            TokenKind::NotEqEq => Some(CompareOp::NotIdentical),
            TokenKind::Lt => Some(CompareOp::Lt),
            TokenKind::Le => Some(CompareOp::Le),
            TokenKind::Gt => Some(CompareOp::Gt),
            TokenKind::Ge => Some(CompareOp::Ge),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_list(&mut self) -> Result<Expr, ResolveError> {
        let first = self.parse_concat()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_concat()?);
        }
        Ok(Expr::List(items))
    }

    fn parse_concat(&mut self) -> Result<Expr, ResolveError> {
        let first = self.parse_operand()?;
        self.concat_tail(first)
    }

    /// Continue a concatenation whose first operand is already parsed
    fn concat_tail(
        &mut self,
        first: Expr,
    ) -> Result<Expr, ResolveError> {
        if !self.check(&TokenKind::Tilde) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.eat(&TokenKind::Tilde) {
            parts.push(self.parse_operand()?);
        }
        Ok(Expr::Concat(parts))
    }

    fn parse_operand(&mut self) -> Result<Expr, ResolveError> {
        match self.current().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            TokenKind::Int(i) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(i)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(f)))
            }
            TokenKind::Ident(name) if (name == "true" || name == "false") && !self.next_is_dot() => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(name == "true")))
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_array()
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_list()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LangKey(key) => {
                self.advance();
                let args = if self.check(&TokenKind::LParen) {
                    Some(self.parse_args()?)
                } else {
                    None
                };
                Ok(Expr::Lang { key, args })
            }
            TokenKind::Ident(_) => self.parse_path(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_array(&mut self) -> Result<Expr, ResolveError> {
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            let first = self.parse_concat()?;
            let item = if self.eat(&TokenKind::FatArrow) {
                ArrayItem {
                    key: Some(first),
                    value: self.parse_concat()?,
                }
            } else {
                ArrayItem {
                    key: None,
                    value: first,
                }
            };
            items.push(item);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        Ok(Expr::Array(items))
    }

    fn parse_path(&mut self) -> Result<Expr, ResolveError> {
        let mut segments = vec![self.parse_segment()?];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.parse_segment()?);
        }
        Ok(Expr::Path(Path { segments }))
    }

    fn parse_segment(&mut self) -> Result<Segment, ResolveError> {
        let name = match self.current().clone() {
            TokenKind::Ident(name) => name,
            TokenKind::Int(i) if i >= 0 => i.to_string(),
            _ => return Err(self.unexpected("a name")),
        };
        self.advance();
        let args = if self.check(&TokenKind::LParen) {
            Some(self.parse_args()?)
        } else {
            None
        };
        Ok(Segment { name, args })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ResolveError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_concat()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(args)
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn next_is_dot(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(TokenKind::Dot)
        )
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(
        &self,
        kind: &TokenKind,
    ) -> bool {
        self.current() == kind
    }

    fn eat(
        &mut self,
        kind: &TokenKind,
    ) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a case-insensitive keyword written as an identifier
    fn eat_word(
        &mut self,
        word: &str,
    ) -> bool {
        match self.current() {
            TokenKind::Ident(name) if name.eq_ignore_ascii_case(word) => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn expect(
        &mut self,
        kind: &TokenKind,
        expected: &'static str,
    ) -> Result<(), ResolveError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(
        &self,
        expected: &'static str,
    ) -> ResolveError {
        let found = match self.current() {
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        };
        ResolveError::Syntax {
            found,
            expected,
            source_text: self.source.to_string(),
        }
    }
}

/// Parse an expression string
pub fn parse(source: &str) -> Result<Expr, ResolveError> {
    Parser::new(source)?.parse_expression()
}

/// Parse an `IF` condition string
pub fn parse_condition(source: &str) -> Result<Condition, ResolveError> {
    Parser::new(source)?.parse_condition()
}
