//! Expression evaluation against a value context
//!
//! Lookup order for a path segment:
//!
//! 1. mapping key / list index
//! 2. object property (instances only)
//! 3. object method (static dispatch on class-like objects)
//! 4. at the root: a global free function
//!
//! Anything not found is a silent miss and resolves to `false`, unless the
//! resolver runs in strict mode.

use tracing::{debug, error, warn};

use super::ast::*;
use super::parser;
use crate::error::ResolveError;
use crate::functions::FunctionTable;
use crate::lang::Translator;
use crate::value::{Callable, Map, Value};

/// Evaluates expressions and conditions against one scope
pub struct Resolver<'a> {
    scope: &'a Map,
    functions: &'a FunctionTable,
    translator: &'a dyn Translator,
    strict: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(
        scope: &'a Map,
        functions: &'a FunctionTable,
        translator: &'a dyn Translator,
    ) -> Self {
        Self {
            scope,
            functions,
            translator,
            strict: false,
        }
    }

    /// Raise on unresolved names instead of yielding `false`
    pub fn strict(
        mut self,
        strict: bool,
    ) -> Self {
        self.strict = strict;
        self
    }

    /// Parse and resolve expression text
    pub fn resolve_str(
        &self,
        text: &str,
    ) -> Result<Value, ResolveError> {
        match parser::parse(text) {
            Ok(expr) => self.resolve(&expr),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                warn!(expression = text, error = %e, "unparsable expression resolved to false");
                Ok(Value::Bool(false))
            }
        }
    }

    /// Resolve an expression to a value
    pub fn resolve(
        &self,
        expr: &Expr,
    ) -> Result<Value, ResolveError> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Array(items) => self.build_array(items),
            Expr::Path(path) => self.resolve_path(path),
            Expr::Lang { key, args } => self.translate(key, args.as_deref()),
            Expr::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&self.resolve(part)?.to_output_string());
                }
                Ok(Value::String(out))
            }
            Expr::List(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Invalid { text, message } => {
                if self.strict {
                    Err(ResolveError::Invalid {
                        text: text.clone(),
                        message: message.clone(),
                    })
                } else {
                    warn!(expression = %text, error = %message, "invalid expression resolved to false");
                    Ok(Value::Bool(false))
                }
            }
        }
    }

    /// Translate `key`; list arguments are flattened into positional ones
    pub fn translate(
        &self,
        key: &str,
        args: Option<&[Expr]>,
    ) -> Result<Value, ResolveError> {
        let mut flat = Vec::new();
        for value in self.resolve_args(args)? {
            match value {
                Value::List(items) => flat.extend(items),
                other => flat.push(other),
            }
        }
        Ok(Value::String(self.translator.translate(key, &flat)))
    }

    /// Evaluate a condition
    pub fn test(
        &self,
        cond: &Condition,
    ) -> Result<bool, ResolveError> {
        match cond {
            Condition::Value(expr) => Ok(self.resolve(expr)?.is_truthy()),
            Condition::Not(inner) => Ok(!self.test(inner)?),
            Condition::And(a, b) => Ok(self.test(a)? && self.test(b)?),
            Condition::Or(a, b) => Ok(self.test(a)? || self.test(b)?),
            Condition::Compare { op, lhs, rhs } => {
                let l = self.resolve(lhs)?;
                let r = self.resolve(rhs)?;
                Ok(compare(*op, &l, &r))
            }
        }
    }

    fn build_array(
        &self,
        items: &[ArrayItem],
    ) -> Result<Value, ResolveError> {
        if items.iter().all(|item| item.key.is_none()) {
            return items
                .iter()
                .map(|item| self.resolve(&item.value))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }
        // unkeyed items continue the integer sequence, as in PHP arrays
        // `None` once an integer key of i64::MAX leaves no next index
        let mut map = Map::new();
        let mut next_index: Option<i64> = Some(0);
        for item in items {
            let key = match &item.key {
                Some(key) => {
                    let key = self.resolve(key)?.to_output_string();
                    if let (Ok(i), Some(next)) = (key.parse::<i64>(), next_index) {
                        next_index = i.checked_add(1).map(|after| next.max(after));
                    }
                    key
                }
                None => match next_index {
                    Some(index) => {
                        next_index = index.checked_add(1);
                        index.to_string()
                    }
                    None => {
                        warn!("array literal has no free integer key left, element dropped");
                        continue;
                    }
                },
            };
            let value = self.resolve(&item.value)?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn resolve_path(
        &self,
        path: &Path,
    ) -> Result<Value, ResolveError> {
        let mut segments = path.segments.iter();
        let Some(first) = segments.next() else {
            return Ok(Value::Null);
        };
        let mut current = match self.lookup_root(first)? {
            Some(value) => value,
            None => return self.miss(&first.name),
        };
        for seg in segments {
            current = match self.lookup_member(&current, seg)? {
                Some(value) => value,
                None => return self.miss(&path.to_string()),
            };
        }
        Ok(current)
    }

    fn lookup_root(
        &self,
        seg: &Segment,
    ) -> Result<Option<Value>, ResolveError> {
        if let Some(value) = self.scope.get(&seg.name) {
            return self.apply_args(value.clone(), seg).map(Some);
        }
        if let Some(func) = self.functions.get(&seg.name) {
            let args = self.resolve_args(seg.args.as_deref())?;
            return self.invoke(func, &seg.name, &args).map(Some);
        }
        Ok(None)
    }

    fn lookup_member(
        &self,
        parent: &Value,
        seg: &Segment,
    ) -> Result<Option<Value>, ResolveError> {
        match parent {
            Value::Map(_) | Value::List(_) => match parent.get(&seg.name) {
                Some(value) => self.apply_args(value.clone(), seg).map(Some),
                None => Ok(None),
            },
            Value::Object(obj) => {
                if !obj.is_class() {
                    if let Some(value) = obj.get_property(&seg.name) {
                        return self.apply_args(value, seg).map(Some);
                    }
                }
                let args = self.resolve_args(seg.args.as_deref())?;
                match obj.call_method(&seg.name, &args) {
                    Some(Ok(value)) => Ok(Some(value)),
                    Some(Err(source)) => {
                        let target = format!("{}.{}", obj.type_name(), seg.name);
                        error!(method = %target, error = %source, "template method call failed");
                        Err(ResolveError::Call { target, source })
                    }
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    /// Invoke a callable value when the segment carries arguments
    fn apply_args(
        &self,
        value: Value,
        seg: &Segment,
    ) -> Result<Value, ResolveError> {
        match (&value, &seg.args) {
            (Value::Callable(func), Some(args)) => {
                let args = self.resolve_args(Some(args))?;
                self.invoke(func, &seg.name, &args)
            }
            _ => Ok(value),
        }
    }

    fn invoke(
        &self,
        func: &Callable,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ResolveError> {
        func.call(args).map_err(|source| {
            error!(function = name, error = %source, "template function call failed");
            ResolveError::Call {
                target: name.to_string(),
                source,
            }
        })
    }

    fn resolve_args(
        &self,
        args: Option<&[Expr]>,
    ) -> Result<Vec<Value>, ResolveError> {
        args.unwrap_or_default()
            .iter()
            .map(|arg| self.resolve(arg))
            .collect()
    }

    fn miss(
        &self,
        name: &str,
    ) -> Result<Value, ResolveError> {
        if self.strict {
            Err(ResolveError::Undefined(name.to_string()))
        } else {
            debug!(name, "unresolved name resolved to false");
            Ok(Value::Bool(false))
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// Apply a comparison operator
pub fn compare(
    op: CompareOp,
    lhs: &Value,
    rhs: &Value,
) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOp::Eq => lhs.loose_eq(rhs),
        CompareOp::NotEq => !lhs.loose_eq(rhs),
        CompareOp::Identical => lhs.strict_eq(rhs),
        CompareOp::NotIdentical => !lhs.strict_eq(rhs),
        CompareOp::Lt => lhs.loose_cmp(rhs) == Some(Less),
        CompareOp::Le => matches!(lhs.loose_cmp(rhs), Some(Less | Equal)),
        CompareOp::Gt => lhs.loose_cmp(rhs) == Some(Greater),
        CompareOp::Ge => matches!(lhs.loose_cmp(rhs), Some(Greater | Equal)),
    }
}
