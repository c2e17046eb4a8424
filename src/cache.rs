//! Compiled-artifact cache
//!
//! Every template source maps to one artifact file in a flat cache
//! directory:
//!
//! ```text
//! <sha256(absolute source path)>_<basename>.<ext>
//! ```
//!
//! The artifact holds a header line naming the source followed by the RON
//! form of the compiled [`Program`]. It is fresh while its modification
//! time is not older than the source's. Writes go through a temporary file
//! that is renamed into place, so concurrent renders never observe a
//! partial artifact.
//!
//! Loaded programs are also memoized in memory, keyed by artifact path and
//! artifact modification time, so warm renders skip the disk read.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{CacheError, TemplateError};
use crate::markup::{self, Program};

/// Header prefix of every artifact
pub const HEADER_PREFIX: &str = "// Compiled template: ";

/// Cache counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Renders served by a fresh artifact
    pub hits: usize,
    /// Transpile runs
    pub compiles: usize,
    /// Artifacts deserialized from disk
    pub loads: usize,
}

impl CacheStats {
    /// Hit rate in percent
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.compiles;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone)]
struct Loaded {
    modified: SystemTime,
    program: Arc<Program>,
}

/// File-backed cache of compiled templates
#[derive(Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    extension: String,
    /// At most one entry per artifact path; stale entries are evicted
    /// before their source is transpiled again
    loaded: RwLock<HashMap<PathBuf, Loaded>>,
    stats: RwLock<CacheStats>,
}

impl ArtifactCache {
    /// Cache rooted at `dir`; the directory is created on first compile
    pub fn new(
        dir: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
            loaded: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    /// Artifact path for a source file
    pub fn compiled_path(
        &self,
        source: &Path,
    ) -> PathBuf {
        let absolute = absolute(source);
        let digest = Sha256::digest(absolute.to_string_lossy().as_bytes());
        let base = absolute
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dir
            .join(format!("{:x}_{}.{}", digest, base, self.extension))
    }

    /// Whether `artifact` exists and is not older than `source`
    pub fn is_fresh(
        &self,
        source: &Path,
        artifact: &Path,
    ) -> bool {
        match (modified(artifact), modified(source)) {
            (Some(compiled), Some(original)) => compiled >= original,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Write `program` as the artifact for `source`
    pub fn compile(
        &self,
        source: &Path,
        artifact: &Path,
        program: &Program,
    ) -> Result<(), CacheError> {
        self.ensure_dir()?;
        let body = ron::ser::to_string_pretty(program, ron::ser::PrettyConfig::default())
            .map_err(|e| CacheError::Encode(e.to_string()))?;
        let write_err = |source: std::io::Error| CacheError::Write {
            path: artifact.to_path_buf(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        writeln!(tmp, "{}{}", HEADER_PREFIX, absolute(source).display()).map_err(write_err)?;
        tmp.write_all(body.as_bytes()).map_err(write_err)?;
        tmp.persist(artifact).map_err(|e| write_err(e.error))?;

        self.stats.write().compiles += 1;
        debug!(source = %source.display(), artifact = %artifact.display(), "wrote compiled template");
        Ok(())
    }

    /// Read an artifact back
    pub fn load(
        &self,
        artifact: &Path,
    ) -> Result<Program, CacheError> {
        let content = std::fs::read_to_string(artifact).map_err(|source| CacheError::Read {
            path: artifact.to_path_buf(),
            source,
        })?;
        let body = match content.strip_prefix(HEADER_PREFIX) {
            Some(rest) => rest.split_once('\n').map_or("", |(_, body)| body),
            None => content.as_str(),
        };
        let program = ron::from_str(body).map_err(|e| CacheError::Corrupt {
            path: artifact.to_path_buf(),
            message: e.to_string(),
        })?;
        self.stats.write().loads += 1;
        Ok(program)
    }

    /// Compiled program for `source`, transpiling when stale
    ///
    /// A fresh artifact that cannot be read back is treated as stale.
    pub fn get_or_compile(
        &self,
        source: &Path,
    ) -> Result<Arc<Program>, TemplateError> {
        let artifact = self.compiled_path(source);
        if self.is_fresh(source, &artifact) {
            if let Some(program) = self.memoized(&artifact) {
                self.stats.write().hits += 1;
                return Ok(program);
            }
            match self.load(&artifact) {
                Ok(program) => {
                    self.stats.write().hits += 1;
                    return Ok(self.remember(&artifact, program));
                }
                Err(e) => warn!(error = %e, "discarding unreadable compiled template"),
            }
        }
        self.loaded.write().remove(&artifact);
        let program = self.transpile(source)?;
        self.compile(source, &artifact, &program)?;
        Ok(self.remember(&artifact, program))
    }

    /// Transpile `source` without touching the cache
    pub fn transpile(
        &self,
        source: &Path,
    ) -> Result<Program, TemplateError> {
        let text = std::fs::read_to_string(source).map_err(|e| TemplateError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        Ok(markup::transpile(&text, &absolute(source)))
    }

    /// Remove every artifact in the cache directory
    pub fn clear(&self) -> Result<usize, CacheError> {
        self.loaded.write().clear();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == self.extension.as_str()) {
                std::fs::remove_file(&path).map_err(|source| CacheError::Write {
                    path: path.clone(),
                    source,
                })?;
                removed += 1;
            }
        }
        debug!(dir = %self.dir.display(), removed, "cleared template cache");
        Ok(removed)
    }

    fn memoized(
        &self,
        artifact: &Path,
    ) -> Option<Arc<Program>> {
        let stamp = modified(artifact)?;
        let loaded = self.loaded.read();
        loaded
            .get(artifact)
            .filter(|entry| entry.modified == stamp)
            .map(|entry| Arc::clone(&entry.program))
    }

    fn remember(
        &self,
        artifact: &Path,
        program: Program,
    ) -> Arc<Program> {
        let program = Arc::new(program);
        if let Some(stamp) = modified(artifact) {
            self.loaded.write().insert(
                artifact.to_path_buf(),
                Loaded {
                    modified: stamp,
                    program: Arc::clone(&program),
                },
            );
        }
        program
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.dir.is_dir() {
            return Ok(());
        }
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        debug!(dir = %self.dir.display(), "created template cache directory");
        Ok(())
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
