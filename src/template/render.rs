//! Program interpreter
//!
//! Walks a compiled [`Program`] against a mutable scope and appends to an
//! output buffer. `SET` and `FOR` write into the scope, so their bindings
//! stay visible to every later node of the same render.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::engine::Engine;
use crate::error::TemplateError;
use crate::expr::Resolver;
use crate::markup::{Node, Program};
use crate::value::{Map, Value};

pub(crate) struct Renderer<'e> {
    engine: &'e Engine,
    /// Include nesting of the program being rendered
    depth: usize,
    /// Directory relative includes fall back to
    base_dir: PathBuf,
}

impl<'e> Renderer<'e> {
    pub(crate) fn new(
        engine: &'e Engine,
        depth: usize,
        base_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            depth,
            base_dir,
        }
    }

    /// Renderer for a program, with includes resolved next to its source
    pub(crate) fn for_program(
        engine: &'e Engine,
        depth: usize,
        program: &Program,
    ) -> Self {
        let base_dir = program
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(engine, depth, base_dir)
    }

    pub(crate) fn render(
        &self,
        program: &Program,
        scope: &mut Map,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.nodes(&program.nodes, scope, &mut out)?;
        Ok(out)
    }

    fn resolver<'s>(
        &'s self,
        scope: &'s Map,
    ) -> Resolver<'s> {
        Resolver::new(scope, self.engine.functions(), self.engine.translator())
            .strict(self.engine.config().strict)
    }

    fn nodes(
        &self,
        nodes: &[Node],
        scope: &mut Map,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            self.node(node, scope, out)?;
        }
        Ok(())
    }

    fn node(
        &self,
        node: &Node,
        scope: &mut Map,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Comment(_) => {}
            Node::Output(expr) => {
                let value = self.resolver(scope).resolve(expr)?;
                out.push_str(&value.to_output_string());
            }
            Node::Lang { key, args } => {
                let value = self.resolver(scope).translate(key, args.as_deref())?;
                out.push_str(&value.to_output_string());
            }
            Node::If {
                branches,
                otherwise,
            } => {
                for branch in branches {
                    if self.resolver(scope).test(&branch.condition)? {
                        return self.nodes(&branch.body, scope, out);
                    }
                }
                if let Some(body) = otherwise {
                    self.nodes(body, scope, out)?;
                }
            }
            Node::For {
                key,
                item,
                iterable,
                body,
            } => {
                let collection = self.resolver(scope).resolve(iterable)?;
                let entries = collection.iter_entries();
                if entries.is_empty() && !matches!(collection, Value::List(_) | Value::Map(_)) {
                    debug!(value = collection.type_name(), "FOR over a non-iterable value");
                }
                for (k, v) in entries {
                    if let Some(key) = key {
                        scope.insert(key.clone(), k);
                    }
                    scope.insert(item.clone(), v);
                    self.nodes(body, scope, out)?;
                }
            }
            Node::Set { name, value } => {
                let value = self.resolver(scope).resolve(value)?;
                scope.insert(name.clone(), value);
            }
            Node::Dump(expr) => {
                let value = self.resolver(scope).resolve(expr)?;
                out.push_str("<pre>");
                out.push_str(&value.dump());
                out.push_str("</pre>");
            }
            Node::Hook { name, arg: None } => {
                out.push_str(&self.engine.hooks().call_action(name)?);
            }
            Node::Hook {
                name,
                arg: Some(arg),
            } => {
                let value = self.resolver(scope).resolve(arg)?;
                let filtered = self.engine.hooks().call_filter(name, value)?;
                out.push_str(&filtered.to_output_string());
            }
            Node::Include(expr) => self.include(expr, scope, out)?,
        }
        Ok(())
    }

    /// `INCLUDE`: template sources render in their own scope, any other
    /// file runs inline against the caller's scope
    fn include(
        &self,
        expr: &crate::expr::Expr,
        scope: &mut Map,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        let target = self.resolver(scope).resolve(expr)?.to_output_string();
        let Some(path) = self.locate(&target) else {
            warn!(include = %target, "included file not found");
            return Ok(());
        };

        let config = self.engine.config();
        let depth = self.depth + 1;
        if depth > config.max_include_depth {
            return Err(TemplateError::IncludeDepth {
                path,
                limit: config.max_include_depth,
            });
        }

        let is_template = path
            .extension()
            .is_some_and(|ext| ext == config.template_extension.as_str());
        if is_template {
            let program = self.engine.cache().get_or_compile(&path)?;
            let mut child_scope = self.engine.globals().snapshot();
            let rendered = Renderer::for_program(self.engine, depth, &program)
                .render(&program, &mut child_scope)?;
            out.push_str(&rendered);
        } else {
            let program = self.engine.cache().transpile(&path)?;
            Renderer::for_program(self.engine, depth, &program).nodes(&program.nodes, scope, out)?;
        }
        Ok(())
    }

    /// Absolute, then working-directory relative, then next to the including file
    fn locate(
        &self,
        target: &str,
    ) -> Option<PathBuf> {
        if target.is_empty() {
            return None;
        }
        let path = Path::new(target);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.is_relative() {
            let beside = self.base_dir.join(path);
            if beside.is_file() {
                return Some(beside);
            }
        }
        None
    }
}
