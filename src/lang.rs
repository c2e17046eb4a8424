//! Translation lookup for `Lang.key` expressions
//!
//! Catalogs are JSON files mapping keys to message templates. Nested
//! objects are flattened into dotted keys, so
//!
//! ```json
//! { "users": { "welcome": "Hello %s" } }
//! ```
//!
//! answers `{{ Lang.users.welcome(name) }}`. Missing keys translate to the
//! key itself.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::value::Value;

/// `%s`, `%d`, `%2$s`, `%%`
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:(\d+)\$)?([sd%])").expect("placeholder pattern is valid")
});

/// Translation lookup consumed by the resolver
pub trait Translator: Send + Sync {
    /// Translate `key`, interpolating positional `args`
    fn translate(
        &self,
        key: &str,
        args: &[Value],
    ) -> String;
}

/// Translator that echoes keys back
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTranslator;

impl Translator for NullTranslator {
    fn translate(
        &self,
        key: &str,
        _args: &[Value],
    ) -> String {
        key.to_string()
    }
}

/// In-memory message catalog
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&content).map_err(|source| ConfigError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), messages = catalog.len(), "loaded locale catalog");
        Ok(catalog)
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let root: serde_json::Value = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        catalog.flatten("", &root);
        Ok(catalog)
    }

    fn flatten(
        &mut self,
        prefix: &str,
        node: &serde_json::Value,
    ) {
        use serde_json::Value as Json;
        match node {
            Json::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", prefix, k)
                    };
                    self.flatten(&key, v);
                }
            }
            Json::String(s) => {
                self.messages.insert(prefix.to_string(), s.clone());
            }
            Json::Null => {}
            other => {
                self.messages.insert(prefix.to_string(), other.to_string());
            }
        }
    }

    /// Add or replace a message
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Catalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Translator for Catalog {
    fn translate(
        &self,
        key: &str,
        args: &[Value],
    ) -> String {
        match self.messages.get(key) {
            Some(template) => interpolate(template, args),
            None => {
                debug!(key, "missing translation");
                key.to_string()
            }
        }
    }
}

/// Substitute `sprintf`-style placeholders
///
/// Missing arguments substitute as empty text.
pub fn interpolate(
    template: &str,
    args: &[Value],
) -> String {
    let mut next = 0usize;
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let conv = &caps[2];
            if conv == "%" {
                return "%".to_string();
            }
            let index = match caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
                Some(position) => position.saturating_sub(1),
                None => {
                    next += 1;
                    next - 1
                }
            };
            let Some(arg) = args.get(index) else {
                warn!(template, index, "translation placeholder has no argument");
                return String::new();
            };
            if conv == "d" {
                arg.as_number()
                    .map(|n| (n.trunc() as i64).to_string())
                    .unwrap_or_else(|| "0".to_string())
            } else {
                arg.to_output_string()
            }
        })
        .into_owned()
}
