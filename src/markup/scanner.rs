//! Source scanner
//!
//! Splits template source into literal text and delimited pieces:
//!
//! - `{# ... #}` comments, may span lines
//! - `{% NOPARSE %} ... {% ENDNOPARSE %}` raw blocks, may span lines
//! - `{{ ... }}` output tags, single line
//! - `{% ... %}` statement tags, single line
//!
//! An opening delimiter without a matching close stays literal text.

use once_cell::sync::Lazy;
use regex::Regex;

static NOPARSE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*NOPARSE\s*$").expect("noparse pattern is valid"));

static NOPARSE_CLOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{%\s*ENDNOPARSE\s*%\}").expect("endnoparse pattern is valid")
});

/// Kind of a scanned piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PieceKind {
    Text,
    Comment,
    Raw,
    Output,
    Tag,
}

/// One scanned piece
///
/// `body` holds the text between the delimiters, `raw` the full original
/// text including delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece<'a> {
    pub kind: PieceKind,
    pub body: &'a str,
    pub raw: &'a str,
    pub offset: usize,
}

/// Scan a whole template source
pub fn scan(source: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while let Some(found) = source[pos..].find('{') {
        let open = pos + found;
        let rest = &source[open..];
        let matched = if rest.starts_with("{#") {
            scan_comment(source, open)
        } else if rest.starts_with("{{") {
            scan_single_line(source, open, "}}", PieceKind::Output)
        } else if rest.starts_with("{%") {
            scan_single_line(source, open, "%}", PieceKind::Tag)
                .map(|piece| promote_noparse(source, piece))
        } else {
            None
        };

        match matched {
            Some(piece) => {
                if text_start < open {
                    pieces.push(text(source, text_start, open));
                }
                pos = open + piece.raw.len();
                text_start = pos;
                pieces.push(piece);
            }
            None => pos = open + 1,
        }
    }

    if text_start < source.len() {
        pieces.push(text(source, text_start, source.len()));
    }
    pieces
}

fn text(
    source: &str,
    start: usize,
    end: usize,
) -> Piece<'_> {
    Piece {
        kind: PieceKind::Text,
        body: &source[start..end],
        raw: &source[start..end],
        offset: start,
    }
}

fn scan_comment(
    source: &str,
    open: usize,
) -> Option<Piece<'_>> {
    let body_start = open + 2;
    let len = source[body_start..].find("#}")?;
    let end = body_start + len + 2;
    Some(Piece {
        kind: PieceKind::Comment,
        body: &source[body_start..body_start + len],
        raw: &source[open..end],
        offset: open,
    })
}

fn scan_single_line<'a>(
    source: &'a str,
    open: usize,
    close: &str,
    kind: PieceKind,
) -> Option<Piece<'a>> {
    let body_start = open + 2;
    let line_end = source[body_start..]
        .find('\n')
        .map_or(source.len(), |n| body_start + n);
    let len = source[body_start..line_end].find(close)?;
    let end = body_start + len + close.len();
    Some(Piece {
        kind,
        body: &source[body_start..body_start + len],
        raw: &source[open..end],
        offset: open,
    })
}

/// Extend a `{% NOPARSE %}` tag to cover everything up to its end tag
fn promote_noparse<'a>(
    source: &'a str,
    tag: Piece<'a>,
) -> Piece<'a> {
    if !NOPARSE_OPEN.is_match(tag.body) {
        return tag;
    }
    let body_start = tag.offset + tag.raw.len();
    match NOPARSE_CLOSE.find(&source[body_start..]) {
        Some(close) => Piece {
            kind: PieceKind::Raw,
            body: &source[body_start..body_start + close.start()],
            raw: &source[tag.offset..body_start + close.end()],
            offset: tag.offset,
        },
        None => tag,
    }
}

/// 1-based line of a byte offset, for diagnostics
pub fn line_of(
    source: &str,
    offset: usize,
) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}
