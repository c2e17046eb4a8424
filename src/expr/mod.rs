//! Expression language
//!
//! Expressions appear inside `{{ }}` and most `{% %}` tags:
//!
//! ```text
//! user.name                      dotted lookup
//! items.0.title                  list index
//! post.url("abs")                method call
//! "Hello " ~ user.name           concatenation
//! ["a" => 1, "b" => [2, 3]]      array literals
//! Lang.users.welcome(user.name)  translation
//! ```
//!
//! [`parse`] turns text into an [`Expr`] tree once at compile time; a
//! [`Resolver`] evaluates the tree against a scope at render time.

mod ast;
mod lexer;
mod parser;
mod resolve;

#[cfg(test)]
mod tests;

pub use ast::{ArrayItem, CompareOp, Condition, Expr, Literal, Path, Segment};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, parse_condition};
pub use resolve::{compare, Resolver};
