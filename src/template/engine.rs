//! Rendering engine: configuration plus every collaborator a render needs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::globals::Globals;
use super::render::Renderer;
use super::Template;
use crate::cache::ArtifactCache;
use crate::config::EngineConfig;
use crate::error::TemplateError;
use crate::functions::FunctionTable;
use crate::hooks::HookRegistry;
use crate::lang::{NullTranslator, Translator};
use crate::markup;
use crate::value::{Map, Value};

static SHARED: Lazy<Arc<Engine>> = Lazy::new(|| {
    Engine::builder().config(EngineConfig::load()).build()
});

/// Template engine
pub struct Engine {
    config: EngineConfig,
    cache: ArtifactCache,
    globals: Globals,
    hooks: HookRegistry,
    translator: Arc<dyn Translator>,
    functions: FunctionTable,
}

impl std::fmt::Debug for Engine {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("globals", &self.globals.len())
            .field("functions", &self.functions.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`]
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    globals: Option<Globals>,
    hooks: Option<HookRegistry>,
    translator: Option<Arc<dyn Translator>>,
    functions: Option<FunctionTable>,
}

impl EngineBuilder {
    pub fn config(
        mut self,
        config: EngineConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Global registry; the process-wide one behind [`Template::add_global`]
    /// is used when unset, pass [`Globals::new`] for an isolated engine
    pub fn globals(
        mut self,
        globals: Globals,
    ) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn hooks(
        mut self,
        hooks: HookRegistry,
    ) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn translator(
        mut self,
        translator: impl Translator + 'static,
    ) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Function table; the builtins are used when unset
    pub fn functions(
        mut self,
        functions: FunctionTable,
    ) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn build(self) -> Arc<Engine> {
        let cache = ArtifactCache::new(&self.config.cache_dir, &self.config.artifact_extension);
        Arc::new(Engine {
            cache,
            globals: self.globals.unwrap_or_else(Globals::process),
            hooks: self.hooks.unwrap_or_default(),
            translator: self.translator.unwrap_or_else(|| Arc::new(NullTranslator)),
            functions: self.functions.unwrap_or_default(),
            config: self.config,
        })
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Engine with `config` and default collaborators
    pub fn new(config: EngineConfig) -> Arc<Engine> {
        Self::builder().config(config).build()
    }

    /// Process-wide engine used by [`Template::new`]
    ///
    /// Built on first use from [`EngineConfig::load`].
    pub fn shared() -> Arc<Engine> {
        Arc::clone(&SHARED)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Register a global visible to every later render of this engine
    pub fn add_global(
        &self,
        name: &str,
        value: impl Into<Value>,
    ) {
        self.globals.set(name, value);
    }

    /// Template bound to this engine
    pub fn template(
        self: &Arc<Self>,
        path: impl Into<PathBuf>,
    ) -> Template {
        Template::with_engine(path, Arc::clone(self))
    }

    /// Render template source text that has no backing file
    ///
    /// Nothing is cached. Relative includes resolve against the working
    /// directory.
    pub fn render_str(
        &self,
        source: &str,
        data: Map,
    ) -> Result<String, TemplateError> {
        let program = markup::transpile(source, Path::new("<inline>"));
        let mut scope = self.globals.snapshot();
        scope.extend(data);
        Renderer::new(self, 0, PathBuf::new()).render(&program, &mut scope)
    }

    /// Transpile `source` unconditionally and write its artifact
    pub fn compile(
        &self,
        source: &Path,
    ) -> Result<PathBuf, TemplateError> {
        let artifact = self.cache.compiled_path(source);
        let program = self.cache.transpile(source)?;
        self.cache.compile(source, &artifact, &program)?;
        Ok(artifact)
    }

    /// Compile every stale template under `dir`, returning how many were compiled
    pub fn warm(
        &self,
        dir: &Path,
    ) -> Result<usize, TemplateError> {
        let mut compiled = 0;
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| TemplateError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                source: e.into(),
            })?;
            let path = entry.path();
            let is_template = entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == self.config.template_extension.as_str());
            if !is_template {
                continue;
            }
            let artifact = self.cache.compiled_path(path);
            if self.cache.is_fresh(path, &artifact) {
                debug!(file = %path.display(), "artifact already fresh");
                continue;
            }
            self.compile(path)?;
            compiled += 1;
        }
        info!(dir = %dir.display(), compiled, "warmed template cache");
        Ok(compiled)
    }
}
