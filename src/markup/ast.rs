//! Compiled template program
//!
//! A [`Program`] is what the artifact cache stores: the node tree of one
//! source file, with every expression already parsed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::expr::{Condition, Expr};

/// A compiled template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Source file the program was compiled from
    pub source: PathBuf,
    pub nodes: Vec<Node>,
}

/// One `IF` / `ELSEIF` arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub condition: Condition,
    pub body: Vec<Node>,
}

/// Template node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal text, emitted as is
    Text(String),
    /// `{# ... #}`, kept for debugging, never rendered
    Comment(String),
    /// `{{ expr }}`
    Output(Expr),
    /// `{{ Lang.key(args) }}`
    Lang {
        key: String,
        args: Option<Vec<Expr>>,
    },
    /// `{% IF %}` ... `{% ELSEIF %}` ... `{% ELSE %}` ... `{% ENDIF %}`
    If {
        branches: Vec<Branch>,
        otherwise: Option<Vec<Node>>,
    },
    /// `{% FOR [key ,] item IN iterable %}` ... `{% ENDFOR %}`
    For {
        key: Option<String>,
        item: String,
        iterable: Expr,
        body: Vec<Node>,
    },
    /// `{% SET name = value %}`
    Set { name: String, value: Expr },
    /// `{% DUMP expr %}`
    Dump(Expr),
    /// `{% HOOK.name %}` (action) or `{% HOOK.name(arg) %}` (filter)
    Hook { name: String, arg: Option<Expr> },
    /// `{% INCLUDE path %}`
    Include(Expr),
}

impl Program {
    /// Number of nodes, counting nested bodies
    pub fn node_count(&self) -> usize {
        count(&self.nodes)
    }
}

fn count(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| {
            1 + match node {
                Node::If {
                    branches,
                    otherwise,
                } => {
                    branches.iter().map(|b| count(&b.body)).sum::<usize>()
                        + otherwise.as_deref().map_or(0, count)
                }
                Node::For { body, .. } => count(body),
                _ => 0,
            }
        })
        .sum()
}
