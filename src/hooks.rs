//! In-process hook registry
//!
//! A hook is a named extension point with an ordered list of handlers.
//! `{% HOOK.name %}` runs them as actions and concatenates their output;
//! `{% HOOK.name(arg) %}` pipes `arg` through them as filters.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, error};

use crate::error::TemplateError;
use crate::value::{Callable, Value};

/// Cloneable handle to a shared hook table
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: Arc<RwLock<IndexMap<String, Vec<Callable>>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `name`
    pub fn add(
        &self,
        name: &str,
        handler: Callable,
    ) {
        self.hooks
            .write()
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    /// Append a closure as a handler to `name`
    pub fn add_fn<F>(
        &self,
        name: &str,
        func: F,
    ) where
        F: Fn(&[Value]) -> Result<Value, crate::error::CallError> + Send + Sync + 'static,
    {
        self.add(name, Callable::new(name, func));
    }

    pub fn has(
        &self,
        name: &str,
    ) -> bool {
        self.hooks
            .read()
            .get(name)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// Number of handlers registered under `name`
    pub fn count(
        &self,
        name: &str,
    ) -> usize {
        self.hooks.read().get(name).map_or(0, Vec::len)
    }

    /// Handlers are cloned out so none run under the lock
    fn handlers(
        &self,
        name: &str,
    ) -> Vec<Callable> {
        self.hooks.read().get(name).cloned().unwrap_or_default()
    }

    /// Run every handler with no arguments and concatenate their output
    ///
    /// An unknown hook yields an empty string.
    pub fn call_action(
        &self,
        name: &str,
    ) -> Result<String, TemplateError> {
        let handlers = self.handlers(name);
        if handlers.is_empty() {
            debug!(hook = name, "no handlers for action hook");
        }
        let mut out = String::new();
        for handler in handlers {
            let value = handler.call(&[]).map_err(|source| hook_failed(name, source))?;
            out.push_str(&value.to_output_string());
        }
        Ok(out)
    }

    /// Pipe `value` through every handler in registration order
    ///
    /// An unknown hook returns `value` unchanged.
    pub fn call_filter(
        &self,
        name: &str,
        value: Value,
    ) -> Result<Value, TemplateError> {
        let mut current = value;
        for handler in self.handlers(name) {
            current = handler
                .call(std::slice::from_ref(&current))
                .map_err(|source| hook_failed(name, source))?;
        }
        Ok(current)
    }

    /// Drop every handler of `name`
    pub fn clear(
        &self,
        name: &str,
    ) {
        self.hooks.write().shift_remove(name);
    }
}

fn hook_failed(
    name: &str,
    source: crate::error::CallError,
) -> TemplateError {
    error!(hook = name, error = %source, "hook handler failed");
    TemplateError::Hook {
        hook: name.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;

    fn suffix(s: &'static str) -> impl Fn(&[Value]) -> Result<Value, CallError> {
        move |args: &[Value]| {
            let base = args.first().map(Value::to_output_string).unwrap_or_default();
            Ok(Value::String(format!("{}{}", base, s)))
        }
    }

    #[test]
    fn test_filter_chains_in_registration_order() {
        let hooks = HookRegistry::new();
        hooks.add_fn("title", suffix("-a"));
        hooks.add_fn("title", suffix("-b"));
        assert_eq!(
            hooks.call_filter("title", Value::from("x")).unwrap(),
            Value::from("x-a-b")
        );
        assert_eq!(hooks.count("title"), 2);
    }

    #[test]
    fn test_action_concatenates() {
        let hooks = HookRegistry::new();
        hooks.add_fn("head", |_: &[Value]| Ok(Value::from("<a>")));
        hooks.add_fn("head", |_: &[Value]| Ok(Value::from("<b>")));
        assert_eq!(hooks.call_action("head").unwrap(), "<a><b>");
    }

    #[test]
    fn test_unknown_hook_is_inert() {
        let hooks = HookRegistry::new();
        assert!(!hooks.has("nope"));
        assert_eq!(hooks.call_action("nope").unwrap(), "");
        assert_eq!(
            hooks.call_filter("nope", Value::Int(3)).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_failing_handler_raises() {
        let hooks = HookRegistry::new();
        hooks.add_fn("bad", |_: &[Value]| Err(CallError::msg("boom")));
        assert!(matches!(
            hooks.call_action("bad"),
            Err(TemplateError::Hook { ref hook, .. }) if hook == "bad"
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let hooks = HookRegistry::new();
        let other = hooks.clone();
        other.add_fn("x", suffix("!"));
        assert!(hooks.has("x"));
        hooks.clear("x");
        assert!(!other.has("x"));
    }
}
