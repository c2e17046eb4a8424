//! Error taxonomy
//!
//! Only a few failures are ever surfaced to callers:
//!
//! | Class | Type | Behaviour |
//! |-------|------|-----------|
//! | Missing source | - | logged, inline diagnostic string returned |
//! | Cache directory uncreatable | [`CacheError::CreateDir`] | raised |
//! | Unresolvable expression / unknown hook / malformed tag | - | degraded to `false` or empty output |
//! | Strict-mode miss | [`ResolveError::Undefined`] | raised |
//! | Runtime call failure | [`ResolveError::Call`], [`TemplateError::Hook`] | logged, raised |
//! | Include nesting too deep | [`TemplateError::IncludeDepth`] | raised |

use std::path::PathBuf;

/// Failure raised by a method, function, hook or callable invoked from a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("{name}() cannot operate on {found}")]
    Type { name: String, found: &'static str },
    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Shorthand for a free-form failure message
    pub fn msg(message: impl Into<String>) -> Self {
        CallError::Failed(message.into())
    }
}

/// Expression parsing and resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("unexpected character '{ch}' at offset {offset} in `{source_text}`")]
    UnexpectedChar {
        ch: char,
        offset: usize,
        source_text: String,
    },
    #[error("unterminated string literal in `{0}`")]
    UnterminatedString(String),
    #[error("unexpected {found} in `{source_text}`, expected {expected}")]
    Syntax {
        found: String,
        expected: &'static str,
        source_text: String,
    },
    #[error("undefined variable `{0}`")]
    Undefined(String),
    #[error("invalid expression `{text}`: {message}")]
    Invalid { text: String, message: String },
    #[error("call to `{target}` failed: {source}")]
    Call {
        target: String,
        #[source]
        source: CallError,
    },
}

/// Compiled-artifact cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Unable to create template cache directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to write compiled template: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to read compiled template: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Compiled template {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("Unable to encode compiled template: {0}")]
    Encode(String),
}

/// Top-level rendering error
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("hook `{hook}` failed: {source}")]
    Hook {
        hook: String,
        #[source]
        source: CallError,
    },
    #[error("include nesting exceeded {limit} levels at {path}")]
    IncludeDepth { path: PathBuf, limit: usize },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse locale catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias used across the renderer
pub type Result<T, E = TemplateError> = std::result::Result<T, E>;
