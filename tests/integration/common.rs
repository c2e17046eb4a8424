//! Shared fixtures for the integration suite

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parchment::{Engine, EngineBuilder, EngineConfig, Globals};
use tempfile::TempDir;

/// Template directory plus an engine caching into it
pub struct Fixture {
    pub dir: TempDir,
    pub engine: Arc<Engine>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(|b| b)
    }

    /// Fixture whose builder is adjusted before the engine is built
    pub fn build(customize: impl FnOnce(EngineBuilder) -> EngineBuilder) -> Self {
        Self::setup(|c| c, customize)
    }

    pub fn with_config(adjust: impl FnOnce(EngineConfig) -> EngineConfig) -> Self {
        Self::setup(adjust, |b| b)
    }

    fn setup(
        adjust: impl FnOnce(EngineConfig) -> EngineConfig,
        customize: impl FnOnce(EngineBuilder) -> EngineBuilder,
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let config = adjust(EngineConfig::default().with_cache_dir(dir.path().join("cache")));
        let engine = customize(Engine::builder().config(config).globals(Globals::new())).build();
        Self { dir, engine }
    }

    pub fn write(
        &self,
        name: &str,
        source: &str,
    ) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    pub fn render(
        &self,
        name: &str,
        source: &str,
    ) -> String {
        let path = self.write(name, source);
        self.engine.template(path).output().unwrap()
    }
}

pub fn set_mtime(
    path: &Path,
    time: SystemTime,
) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}
