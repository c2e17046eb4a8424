//! Runtime values flowing through the resolver
//!
//! Templates operate on an untyped value graph. [`Value`] is the single
//! representation for everything a template can see: scalars, lists,
//! ordered mappings, host objects and callables.
//!
//! Host objects plug in through the [`Object`] capability trait instead of
//! runtime reflection. Functions and hook handlers are [`Callable`]s.

mod compare;
mod dump;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CallError;

/// Ordered string-keyed mapping used for `Value::Map`
pub type Map = IndexMap<String, Value>;

/// Host object exposed to templates
///
/// Properties are looked up before methods. A class-like object
/// (`is_class() == true`) stands for a type with no bound instance: it
/// exposes no properties and only its static methods are dispatched.
pub trait Object: fmt::Debug + Send + Sync {
    /// Name shown in dumps and string conversion
    fn type_name(&self) -> &str;

    /// Whether this is a class reference rather than an instance
    fn is_class(&self) -> bool {
        false
    }

    /// Read a named property
    fn get_property(
        &self,
        _name: &str,
    ) -> Option<Value> {
        None
    }

    /// Invoke a named method
    ///
    /// Returns `None` when the object has no such method.
    fn call_method(
        &self,
        _name: &str,
        _args: &[Value],
    ) -> Option<Result<Value, CallError>> {
        None
    }

    /// Entries visited by `FOR` loops, if the object is iterable
    fn entries(&self) -> Option<Vec<(String, Value)>> {
        None
    }
}

type CallFn = dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync;

/// A named, shareable function value
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Arc<CallFn>,
}

impl Callable {
    pub fn new<F>(
        name: impl Into<Arc<str>>,
        func: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with positional arguments
    pub fn call(
        &self,
        args: &[Value],
    ) -> Result<Value, CallError> {
        (self.func)(args)
    }

    /// Identity comparison
    pub fn ptr_eq(
        &self,
        other: &Callable,
    ) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Callable({})", self.name)
    }
}

/// Template runtime value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
    Object(Arc<dyn Object>),
    Callable(Callable),
}

// ============================================================================
// Constructors and queries
// ============================================================================

impl Value {
    /// Wrap a host object
    pub fn object<O: Object + 'static>(object: O) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Wrap a closure as a callable value
    pub fn callable<F>(
        name: &str,
        func: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Value::Callable(Callable::new(name, func))
    }

    /// Build a mapping from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) | Value::Map(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "callable",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key in a list or mapping
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Pairs visited by a `FOR` loop
    ///
    /// Lists yield integer keys, mappings yield their keys (numeric keys
    /// come back as integers), iterable objects yield their entries.
    /// Anything else yields nothing.
    pub fn iter_entries(&self) -> Vec<(Value, Value)> {
        match self {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::Int(i as i64), v.clone()))
                .collect(),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| (key_value(k), v.clone()))
                .collect(),
            Value::Object(obj) => obj
                .entries()
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (key_value(&k), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// String form used for output and concatenation
    pub fn to_output_string(&self) -> String {
        match self {
            Value::Null | Value::Bool(false) => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::List(_) | Value::Map(_) => "Array".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Callable(c) => c.name().to_string(),
        }
    }

    /// Convert into a JSON value
    ///
    /// Objects and callables have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null | Value::Object(_) | Value::Callable(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Mapping keys that look like integers come back as integers
fn key_value(key: &str) -> Value {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => Value::Int(i),
        _ => Value::String(key.to_string()),
    }
}

pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        f.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.to_output_string())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(obj) => Value::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}
