//! Markup transpiler
//!
//! Turns template source into a [`Program`]. Literal text passes through
//! untouched; tags become nodes:
//!
//! ```text
//! {# comment #}                         Node::Comment
//! {% NOPARSE %}...{% ENDNOPARSE %}      Node::Text (verbatim)
//! {{ expr }}                            Node::Output
//! {{ Lang.key(args) }}                  Node::Lang
//! {% IF c %}{% ELSEIF c %}{% ELSE %}    Node::If
//! {% FOR [k ,] v IN list %}             Node::For
//! {% SET name = expr %}                 Node::Set
//! {% DUMP expr %}                       Node::Dump
//! {% HOOK.name %} / {% HOOK.name(a) %}  Node::Hook
//! {% INCLUDE expr %}                    Node::Include
//! ```
//!
//! Tag keywords are case-insensitive. Transpiling never fails.

mod ast;
mod parser;
mod scanner;


use std::path::Path;
use std::time::Instant;

use tracing::debug;

pub use ast::{Branch, Node, Program};
pub use parser::MarkupParser;
pub use scanner::{line_of, scan, Piece, PieceKind};

/// Transpile template source into a program
pub fn transpile(
    source: &str,
    path: &Path,
) -> Program {
    let start = Instant::now();
    let program = MarkupParser::new(source, path).parse();
    debug!(
        file = %path.display(),
        nodes = program.node_count(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "transpiled template"
    );
    program
}
