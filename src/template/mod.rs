//! Template facade
//!
//! ```no_run
//! use parchment::Template;
//!
//! Template::add_global("site_name", "My site");
//!
//! let mut tpl = Template::new("themes/default/page.tpl");
//! tpl.set("title", "Home");
//! let html = tpl.output()?;
//! # Ok::<(), parchment::TemplateError>(())
//! ```
//!
//! `output()` looks up the compiled artifact, transpiles the source when
//! the artifact is stale, then runs the program against the global
//! registry overlaid with the template's own data.

mod engine;
mod globals;
mod render;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;

pub use engine::{Engine, EngineBuilder};
pub use globals::Globals;

use crate::error::TemplateError;
use crate::value::{Map, Value};
use render::Renderer;

/// One template source plus its local data
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    data: Map,
    engine: Arc<Engine>,
}

impl Template {
    /// Template rendered by the shared engine
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_engine(path, Engine::shared())
    }

    pub fn with_engine(
        path: impl Into<PathBuf>,
        engine: Arc<Engine>,
    ) -> Self {
        Self {
            path: path.into(),
            data: Map::new(),
            engine,
        }
    }

    /// Register a process-wide global
    ///
    /// Visible to every later render of an engine that was not built with
    /// its own [`Globals`].
    pub fn add_global(
        name: &str,
        value: impl Into<Value>,
    ) {
        Globals::process().set(name, value);
    }

    /// Bind a local value; locals shadow globals of the same name
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) {
        self.data.insert(name.to_string(), value.into());
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Render the template
    ///
    /// A missing source file is not an error: it is logged and a short
    /// inline message is returned in place of the output.
    pub fn output(&self) -> Result<String, TemplateError> {
        if !self.path.is_file() {
            error!(file = %self.path.display(), "Error loading template file");
            return Ok(format!(
                "Error loading template file ({}).<br/>",
                self.path.display()
            ));
        }

        let program = self.engine.cache().get_or_compile(&self.path)?;
        let mut scope = self.engine.globals().snapshot();
        scope.extend(self.data.iter().map(|(k, v)| (k.clone(), v.clone())));

        Renderer::for_program(&self.engine, 0, &program)
            .render(&program, &mut scope)
            .inspect_err(|e| {
                error!(file = %self.path.display(), error = %e, "template render failed");
            })
    }

    /// Alias of [`Template::output`]
    pub fn render(&self) -> Result<String, TemplateError> {
        self.output()
    }
}
