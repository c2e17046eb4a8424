//! Engine configuration
//!
//! # Resolution order
//!
//! ```text
//! Priority (high → low):
//! 1. Environment (PARCHMENT_CACHE_DIR, PARCHMENT_STRICT)
//! 2. parchment.toml in the working directory
//! 3. Default values
//! ```
//!
//! ```toml
//! cache_dir = "data/cache/templates"
//! strict = false
//! max_include_depth = 32
//! artifact_extension = "ron"
//! template_extension = "tpl"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Project-level config file name
pub const CONFIG_FILE: &str = "parchment.toml";

/// Environment override for the cache directory
pub const ENV_CACHE_DIR: &str = "PARCHMENT_CACHE_DIR";

/// Environment override for strict mode
pub const ENV_STRICT: &str = "PARCHMENT_STRICT";

/// Template engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding compiled artifacts
    pub cache_dir: PathBuf,
    /// Raise on unresolved names instead of rendering `false`
    pub strict: bool,
    /// Maximum `INCLUDE` nesting
    pub max_include_depth: usize,
    /// Extension of artifact files
    pub artifact_extension: String,
    /// Extension of template sources; includes with another extension run inline
    pub template_extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache/templates"),
            strict: false,
            max_include_depth: 32,
            artifact_extension: "ron".to_string(),
            template_extension: "tpl".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve configuration from the environment, `parchment.toml` and defaults
    ///
    /// A broken `parchment.toml` is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::default();
        let project = Path::new(CONFIG_FILE);
        if project.is_file() {
            match Self::from_file(project) {
                Ok(loaded) => {
                    debug!(path = CONFIG_FILE, "loaded engine config");
                    config = loaded;
                }
                Err(e) => warn!(error = %e, "ignoring engine config"),
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|d| !d.is_empty()) {
            self.cache_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup(ENV_STRICT) {
            match parse_flag(&flag) {
                Some(strict) => self.strict = strict,
                None => warn!(value = %flag, "{} is not a boolean", ENV_STRICT),
            }
        }
    }

    pub fn with_cache_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_strict(
        mut self,
        strict: bool,
    ) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_include_depth(
        mut self,
        depth: usize,
    ) -> Self {
        self.max_include_depth = depth;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
