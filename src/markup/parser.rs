//! Tag parser: scanned pieces to a node tree
//!
//! Block structure is recovered leniently. Stray `ELSE`/`ELSEIF`/`ENDIF`/
//! `ENDFOR` tags are dropped, blocks still open at end of input are closed,
//! unknown tags stay literal text and unparsable expressions become
//! [`Expr::Invalid`] so they degrade at render time instead of failing the
//! compile.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::ast::{Branch, Node, Program};
use super::scanner::{line_of, scan, Piece, PieceKind};
use crate::expr::{self, Condition, Expr};

/// `item IN list` / `key , item IN list`
static FOR_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^(.+?)\s+IN\s+(.+)$").expect("for pattern is valid"));

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("ident pattern is valid"));

/// Open block on the parser stack
enum Frame {
    If {
        done: Vec<Branch>,
        condition: Condition,
        body: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    },
    For {
        key: Option<String>,
        item: String,
        iterable: Expr,
        body: Vec<Node>,
    },
}

impl Frame {
    fn body_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Frame::If {
                otherwise: Some(body),
                ..
            } => body,
            Frame::If { body, .. } | Frame::For { body, .. } => body,
        }
    }

    fn close(self) -> Node {
        match self {
            Frame::If {
                mut done,
                condition,
                body,
                otherwise,
            } => {
                done.push(Branch { condition, body });
                Node::If {
                    branches: done,
                    otherwise,
                }
            }
            Frame::For {
                key,
                item,
                iterable,
                body,
            } => Node::For {
                key,
                item,
                iterable,
                body,
            },
        }
    }
}

/// Builds the node tree from scanned pieces
pub struct MarkupParser<'a> {
    source: &'a str,
    path: &'a Path,
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl<'a> MarkupParser<'a> {
    pub fn new(
        source: &'a str,
        path: &'a Path,
    ) -> Self {
        Self {
            source,
            path,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Consume the source and produce the program
    pub fn parse(mut self) -> Program {
        for piece in scan(self.source) {
            match piece.kind {
                PieceKind::Text | PieceKind::Raw => self.push_text(piece.body),
                PieceKind::Comment => self.push(Node::Comment(piece.body.trim().to_string())),
                PieceKind::Output => {
                    let node = self.output(&piece);
                    self.push(node);
                }
                PieceKind::Tag => self.tag(&piece),
            }
        }
        while let Some(frame) = self.stack.pop() {
            warn!(
                file = %self.path.display(),
                block = frame_name(&frame),
                "unclosed block closed at end of template"
            );
            let node = frame.close();
            self.push(node);
        }
        Program {
            source: self.path.to_path_buf(),
            nodes: self.root,
        }
    }

    // ------------------------------------------------------------------
    // Tree building
    // ------------------------------------------------------------------

    fn target(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => frame.body_mut(),
            None => &mut self.root,
        }
    }

    fn push(
        &mut self,
        node: Node,
    ) {
        self.target().push(node);
    }

    /// Append text, merging with a preceding text node
    fn push_text(
        &mut self,
        text: &str,
    ) {
        if text.is_empty() {
            return;
        }
        let target = self.target();
        if let Some(Node::Text(last)) = target.last_mut() {
            last.push_str(text);
        } else {
            target.push(Node::Text(text.to_string()));
        }
    }

    fn stray(
        &self,
        piece: &Piece<'_>,
    ) {
        warn!(
            file = %self.path.display(),
            line = line_of(self.source, piece.offset),
            tag = piece.raw,
            "stray tag dropped"
        );
    }

    // ------------------------------------------------------------------
    // Pieces
    // ------------------------------------------------------------------

    fn output(
        &self,
        piece: &Piece<'_>,
    ) -> Node {
        match self.expression(piece, piece.body) {
            Expr::Lang { key, args } => Node::Lang { key, args },
            expr => Node::Output(expr),
        }
    }

    fn tag(
        &mut self,
        piece: &Piece<'_>,
    ) {
        let body = piece.body.trim();
        let split = body
            .find(|c: char| c.is_whitespace() || c == '.')
            .unwrap_or(body.len());
        let keyword = body[..split].to_ascii_uppercase();
        let rest = &body[split..];
        let args = rest.trim();

        match keyword.as_str() {
            "IF" if !args.is_empty() => {
                let condition = self.condition(piece, args);
                self.stack.push(Frame::If {
                    done: Vec::new(),
                    condition,
                    body: Vec::new(),
                    otherwise: None,
                });
            }
            "ELSEIF" if !args.is_empty() => {
                let condition = self.condition(piece, args);
                match self.stack.last_mut() {
                    Some(Frame::If {
                        done,
                        condition: current,
                        body,
                        otherwise: None,
                    }) => {
                        let previous = std::mem::replace(current, condition);
                        done.push(Branch {
                            condition: previous,
                            body: std::mem::take(body),
                        });
                    }
                    _ => self.stray(piece),
                }
            }
            "ELSE" if args.is_empty() => match self.stack.last_mut() {
                Some(Frame::If {
                    otherwise: otherwise @ None,
                    ..
                }) => *otherwise = Some(Vec::new()),
                _ => self.stray(piece),
            },
            "ENDIF" if args.is_empty() => self.close_block(piece, |f| matches!(f, Frame::If { .. })),
            "ENDFOR" if args.is_empty() => {
                self.close_block(piece, |f| matches!(f, Frame::For { .. }))
            }
            "FOR" => match self.for_frame(piece, args) {
                Some(frame) => self.stack.push(frame),
                None => self.push_text(piece.raw),
            },
            "SET" => match args.split_once('=') {
                Some((name, value)) if IDENT.is_match(name.trim()) => {
                    let value = self.expression(piece, value);
                    self.push(Node::Set {
                        name: name.trim().to_string(),
                        value,
                    });
                }
                _ => self.push_text(piece.raw),
            },
            "DUMP" if !args.is_empty() => {
                let expr = self.expression(piece, args);
                self.push(Node::Dump(expr));
            }
            "HOOK" if rest.starts_with('.') => match self.hook(piece, &rest[1..]) {
                Some(node) => self.push(node),
                None => self.push_text(piece.raw),
            },
            "INCLUDE" if !args.is_empty() => {
                let expr = self.expression(piece, args);
                self.push(Node::Include(expr));
            }
            _ => self.push_text(piece.raw),
        }
    }

    fn close_block(
        &mut self,
        piece: &Piece<'_>,
        is_match: impl Fn(&Frame) -> bool,
    ) {
        match self.stack.last() {
            Some(frame) if is_match(frame) => {
                if let Some(frame) = self.stack.pop() {
                    let node = frame.close();
                    self.push(node);
                }
            }
            _ => self.stray(piece),
        }
    }

    fn for_frame(
        &self,
        piece: &Piece<'_>,
        args: &str,
    ) -> Option<Frame> {
        let caps = FOR_PARTS.captures(args)?;
        let names: Vec<&str> = caps[1].split(',').map(str::trim).collect();
        if !names.iter().all(|n| IDENT.is_match(n)) {
            return None;
        }
        let (key, item) = match names.as_slice() {
            [item] => (None, item.to_string()),
            [key, item] => (Some(key.to_string()), item.to_string()),
            _ => return None,
        };
        Some(Frame::For {
            key,
            item,
            iterable: self.expression(piece, &caps[2]),
            body: Vec::new(),
        })
    }

    /// `name` or `name(arg)` after `HOOK.`
    fn hook(
        &self,
        piece: &Piece<'_>,
        call: &str,
    ) -> Option<Node> {
        let call = call.trim();
        let (name, arg) = match call.find('(') {
            Some(open) => {
                let inner = call[open + 1..].strip_suffix(')')?;
                (call[..open].trim(), Some(self.expression(piece, inner)))
            }
            None => (call, None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some(Node::Hook {
            name: name.to_string(),
            arg,
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(
        &self,
        piece: &Piece<'_>,
        text: &str,
    ) -> Expr {
        let text = text.trim();
        expr::parse(text).unwrap_or_else(|e| {
            warn!(
                file = %self.path.display(),
                line = line_of(self.source, piece.offset),
                error = %e,
                "unparsable expression"
            );
            Expr::Invalid {
                text: text.to_string(),
                message: e.to_string(),
            }
        })
    }

    fn condition(
        &self,
        piece: &Piece<'_>,
        text: &str,
    ) -> Condition {
        expr::parse_condition(text).unwrap_or_else(|e| {
            warn!(
                file = %self.path.display(),
                line = line_of(self.source, piece.offset),
                error = %e,
                "unparsable condition"
            );
            Condition::Value(Expr::Invalid {
                text: text.to_string(),
                message: e.to_string(),
            })
        })
    }
}

fn frame_name(frame: &Frame) -> &'static str {
    match frame {
        Frame::If { .. } => "IF",
        Frame::For { .. } => "FOR",
    }
}
