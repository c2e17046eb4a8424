//! Global free functions callable from expressions
//!
//! `{{ count(items) }}`, `{{ strtoupper(name) }}` and friends resolve
//! through a [`FunctionTable`] after the scope lookup fails.

use std::collections::HashMap;

use crate::error::CallError;
use crate::value::{Callable, Value};

/// Name -> function table
#[derive(Debug, Clone)]
pub struct FunctionTable {
    functions: HashMap<String, Callable>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FunctionTable {
    /// Empty table
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Table pre-populated with the builtin helpers
    pub fn with_builtins() -> Self {
        let mut table = Self::empty();
        table.register("count", builtin_count);
        table.register("implode", builtin_implode);
        table.register("strtoupper", |args: &[Value]| {
            Ok(Value::String(string_arg("strtoupper", args)?.to_uppercase()))
        });
        table.register("strtolower", |args: &[Value]| {
            Ok(Value::String(string_arg("strtolower", args)?.to_lowercase()))
        });
        table.register("ucfirst", |args: &[Value]| {
            let s = string_arg("ucfirst", args)?;
            let mut chars = s.chars();
            let out = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            Ok(Value::String(out))
        });
        table.register("trim", |args: &[Value]| {
            Ok(Value::String(string_arg("trim", args)?.trim().to_string()))
        });
        table.register("htmlspecialchars", |args: &[Value]| {
            Ok(Value::String(escape_html(&string_arg(
                "htmlspecialchars",
                args,
            )?)))
        });
        table.register("json_encode", |args: &[Value]| {
            expect_args("json_encode", args, 1)?;
            serde_json::to_string(&args[0].to_json())
                .map(Value::String)
                .map_err(|e| CallError::msg(e.to_string()))
        });
        table.register("in_array", |args: &[Value]| {
            expect_args("in_array", args, 2)?;
            let found = args[1]
                .iter_entries()
                .iter()
                .any(|(_, item)| item.loose_eq(&args[0]));
            Ok(Value::Bool(found))
        });
        table.register("empty", |args: &[Value]| {
            expect_args("empty", args, 1)?;
            Ok(Value::Bool(!args[0].is_truthy()))
        });
        table
    }

    /// Register or replace a function
    pub fn register<F>(
        &mut self,
        name: &str,
        func: F,
    ) where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), Callable::new(name, func));
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn expect_args(
    name: &str,
    args: &[Value],
    expected: usize,
) -> Result<(), CallError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallError::Arity {
            name: name.to_string(),
            expected: expected.to_string(),
            got: args.len(),
        })
    }
}

fn string_arg(
    name: &str,
    args: &[Value],
) -> Result<String, CallError> {
    expect_args(name, args, 1)?;
    match &args[0] {
        v @ (Value::List(_) | Value::Map(_) | Value::Object(_) | Value::Callable(_)) => {
            Err(CallError::Type {
                name: name.to_string(),
                found: v.type_name(),
            })
        }
        v => Ok(v.to_output_string()),
    }
}

fn builtin_count(args: &[Value]) -> Result<Value, CallError> {
    expect_args("count", args, 1)?;
    let n = match &args[0] {
        Value::Null => 0,
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Object(_) => args[0].iter_entries().len(),
        _ => 1,
    };
    Ok(Value::from(n))
}

/// `implode(glue, list)` or `implode(list)`
fn builtin_implode(args: &[Value]) -> Result<Value, CallError> {
    let (glue, list) = match args {
        [list] => (String::new(), list),
        [glue, list] => (glue.to_output_string(), list),
        _ => {
            return Err(CallError::Arity {
                name: "implode".to_string(),
                expected: "1 or 2".to_string(),
                got: args.len(),
            })
        }
    };
    if !matches!(list, Value::List(_) | Value::Map(_)) {
        return Err(CallError::Type {
            name: "implode".to_string(),
            found: list.type_name(),
        });
    }
    let parts: Vec<String> = list
        .iter_entries()
        .iter()
        .map(|(_, v)| v.to_output_string())
        .collect();
    Ok(Value::String(parts.join(&glue)))
}

/// Escape the five HTML-significant characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        name: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        FunctionTable::with_builtins()
            .get(name)
            .expect("builtin registered")
            .call(args)
    }

    #[test]
    fn test_count() {
        assert_eq!(call("count", &[Value::from(vec![1, 2, 3])]), Ok(Value::Int(3)));
        assert_eq!(call("count", &[Value::Null]), Ok(Value::Int(0)));
        assert!(call("count", &[]).is_err());
    }

    #[test]
    fn test_string_helpers() {
        assert_eq!(
            call("strtoupper", &[Value::from("abc")]),
            Ok(Value::from("ABC"))
        );
        assert_eq!(call("ucfirst", &[Value::from("été")]), Ok(Value::from("Été")));
        assert_eq!(call("trim", &[Value::from("  x ")]), Ok(Value::from("x")));
        assert!(matches!(
            call("strtolower", &[Value::from(vec![1])]),
            Err(CallError::Type { .. })
        ));
    }

    #[test]
    fn test_implode() {
        let list = Value::from(vec!["a", "b", "c"]);
        assert_eq!(
            call("implode", &[Value::from(", "), list.clone()]),
            Ok(Value::from("a, b, c"))
        );
        assert_eq!(call("implode", &[list]), Ok(Value::from("abc")));
        assert!(call("implode", &[Value::from(","), Value::Int(1)]).is_err());
    }

    #[test]
    fn test_escape_and_json() {
        assert_eq!(
            call("htmlspecialchars", &[Value::from("<a href=\"x\">&</a>")]),
            Ok(Value::from("&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"))
        );
        assert_eq!(
            call("json_encode", &[Value::map([("a", vec![1, 2])])]),
            Ok(Value::from(r#"{"a":[1,2]}"#))
        );
    }

    #[test]
    fn test_in_array_and_empty() {
        let list = Value::from(vec!["1", "2"]);
        assert_eq!(call("in_array", &[Value::Int(2), list]), Ok(Value::Bool(true)));
        assert_eq!(call("empty", &[Value::from("")]), Ok(Value::Bool(true)));
        assert_eq!(call("empty", &[Value::from("x")]), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_register_replaces() {
        let mut table = FunctionTable::empty();
        table.register("answer", |_: &[Value]| Ok(Value::Int(42)));
        assert!(table.contains("answer"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("answer").unwrap().call(&[]), Ok(Value::Int(42)));
    }
}
