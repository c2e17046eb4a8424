//! Expression AST
//!
//! Every node is serializable so compiled templates can be stored as
//! artifacts and executed without re-parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal value written directly in a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// One element of an array literal, optionally keyed with `=>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// A dotted path segment, optionally invoked with arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub args: Option<Vec<Expr>>,
}

/// Dotted access path: `user.profile.name`, `post.url("abs")`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub segments: Vec<Segment>,
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// `[a, b]` or `["k" => v]`
    Array(Vec<ArrayItem>),
    Path(Path),
    /// `Lang.key` / `Lang.key(args)`
    Lang {
        key: String,
        args: Option<Vec<Expr>>,
    },
    /// `a ~ b ~ c`
    Concat(Vec<Expr>),
    /// Top-level comma list: `a, b`
    List(Vec<Expr>),
    /// Text that failed to parse; resolved as a miss
    Invalid { text: String, message: String },
}

/// Comparison operator in conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Identical,
    NotIdentical,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Condition of `IF` / `ELSEIF`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Value(Expr),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Compare {
        op: CompareOp,
        lhs: Expr,
        rhs: Expr,
    },
}

impl Expr {
    /// Empty expression, resolves to `""`
    pub fn empty() -> Self {
        Expr::Literal(Literal::Str(String::new()))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let op = match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Identical => "===",
            CompareOp::NotIdentical => "!==",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        };
        f.write_str(op)
    }
}

impl fmt::Display for Path {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&seg.name)?;
            if seg.args.is_some() {
                f.write_str("(..)")?;
            }
        }
        Ok(())
    }
}
