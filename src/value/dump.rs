//! Structural dump for `{% DUMP %}`
//!
//! Produces the familiar `var_dump` layout:
//!
//! ```text
//! array(2) {
//!   [0]=>
//!   int(1)
//!   ["name"]=>
//!   string(3) "abc"
//! }
//! ```

use std::fmt::Write;

use super::{format_float, Value};

impl Value {
    /// Human-readable structural dump, terminated by a newline
    pub fn dump(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, 0);
        out
    }
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Null => {
            let _ = writeln!(out, "{pad}NULL");
        }
        Value::Bool(b) => {
            let _ = writeln!(out, "{pad}bool({b})");
        }
        Value::Int(i) => {
            let _ = writeln!(out, "{pad}int({i})");
        }
        Value::Float(f) => {
            let _ = writeln!(out, "{pad}float({})", format_float(*f));
        }
        Value::String(s) => {
            let _ = writeln!(out, "{pad}string({}) \"{s}\"", s.len());
        }
        Value::List(items) => {
            let _ = writeln!(out, "{pad}array({}) {{", items.len());
            for (i, item) in items.iter().enumerate() {
                let _ = writeln!(out, "{pad}  [{i}]=>");
                write_value(out, item, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
        Value::Map(map) => {
            let _ = writeln!(out, "{pad}array({}) {{", map.len());
            for (key, item) in map {
                if key.parse::<i64>().is_ok() {
                    let _ = writeln!(out, "{pad}  [{key}]=>");
                } else {
                    let _ = writeln!(out, "{pad}  [\"{key}\"]=>");
                }
                write_value(out, item, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
        Value::Object(obj) => {
            let entries = obj.entries().unwrap_or_default();
            let _ = writeln!(out, "{pad}object({}) ({}) {{", obj.type_name(), entries.len());
            for (key, item) in &entries {
                let _ = writeln!(out, "{pad}  [\"{key}\"]=>");
                write_value(out, item, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        }
        Value::Callable(c) => {
            let _ = writeln!(out, "{pad}object(Closure) ({})", c.name());
        }
    }
}
