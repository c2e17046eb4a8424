//! Parchment - a tag-based template compiler
//!
//! Template sources mix literal markup with four kinds of tags:
//!
//! - `{{ expr }}` outputs a resolved expression, `{{ Lang.key }}` a translation
//! - `{% IF %}`, `{% FOR %}`, `{% SET %}`, `{% DUMP %}`, `{% HOOK.name %}` and
//!   `{% INCLUDE %}` drive control flow
//! - `{# ... #}` is a comment
//! - `{% NOPARSE %} ... {% ENDNOPARSE %}` is copied verbatim
//!
//! Each source is transpiled once into a [`markup::Program`], stored as a
//! compiled artifact in the cache directory, and reused until the source
//! changes.
//!
//! # Example
//!
//! ```no_run
//! use parchment::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::default().with_cache_dir("/tmp/parchment"));
//! engine.add_global("site_name", "Parchment");
//!
//! let mut page = engine.template("themes/default/index.tpl");
//! page.set("title", "Home");
//! println!("{}", page.output()?);
//! # Ok::<(), parchment::TemplateError>(())
//! ```

#![warn(rust_2018_idioms)]

pub mod cache;
pub mod config;
pub mod error;
pub mod expr;
pub mod functions;
pub mod hooks;
pub mod lang;
pub mod logger;
pub mod markup;
pub mod template;
pub mod value;

pub use cache::{ArtifactCache, CacheStats};
pub use config::EngineConfig;
pub use error::{CacheError, CallError, ConfigError, ResolveError, TemplateError};
pub use functions::FunctionTable;
pub use hooks::HookRegistry;
pub use lang::{Catalog, NullTranslator, Translator};
pub use template::{Engine, EngineBuilder, Globals, Template};
pub use value::{Callable, Map, Object, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "Parchment";
