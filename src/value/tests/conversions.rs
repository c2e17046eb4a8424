//! Conversion and string-form tests for Value

use crate::value::{Callable, Object, Value};
use crate::error::CallError;

#[derive(Debug)]
struct Point;

impl Object for Point {
    fn type_name(&self) -> &str {
        "Point"
    }

    fn entries(&self) -> Option<Vec<(String, Value)>> {
        Some(vec![
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ])
    }
}

#[test]
fn test_output_strings() {
    assert_eq!(Value::Null.to_output_string(), "");
    assert_eq!(Value::Bool(false).to_output_string(), "");
    assert_eq!(Value::Bool(true).to_output_string(), "1");
    assert_eq!(Value::Int(-7).to_output_string(), "-7");
    assert_eq!(Value::Float(2.0).to_output_string(), "2");
    assert_eq!(Value::Float(1.25).to_output_string(), "1.25");
    assert_eq!(Value::from("abc").to_output_string(), "abc");
    assert_eq!(Value::from(vec![1, 2]).to_output_string(), "Array");
    assert_eq!(Value::object(Point).to_output_string(), "Point");
}

#[test]
fn test_from_json() {
    let json = serde_json::json!({
        "name": "a",
        "tags": ["x", "y"],
        "count": 3,
        "ratio": 0.5,
        "missing": null
    });
    let value = Value::from(json);
    assert_eq!(value.get("name"), Some(&Value::from("a")));
    assert_eq!(value.get("count"), Some(&Value::Int(3)));
    assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
    assert_eq!(value.get("missing"), Some(&Value::Null));
    assert_eq!(
        value.get("tags").and_then(|t| t.get("1")),
        Some(&Value::from("y"))
    );
}

#[test]
fn test_to_json_round_trip() {
    let value = Value::map([("a", Value::Int(1)), ("b", Value::from(vec!["x"]))]);
    let json = value.to_json();
    assert_eq!(json, serde_json::json!({"a": 1, "b": ["x"]}));
    assert_eq!(Value::from(json), value);
}

#[test]
fn test_iter_entries() {
    let list = Value::from(vec!["a", "b"]);
    let entries = list.iter_entries();
    assert_eq!(entries[1], (Value::Int(1), Value::from("b")));

    let map = Value::map([("7", "seven"), ("k", "v")]);
    let entries = map.iter_entries();
    assert_eq!(entries[0].0, Value::Int(7));
    assert_eq!(entries[1].0, Value::from("k"));

    let obj = Value::object(Point);
    assert_eq!(obj.iter_entries().len(), 2);

    assert!(Value::Int(5).iter_entries().is_empty());
}

#[test]
fn test_callable_invocation() {
    let double = Callable::new("double", |args: &[Value]| match args.first() {
        Some(Value::Int(i)) => Ok(Value::Int(i * 2)),
        Some(other) => Err(CallError::Type {
            name: "double".to_string(),
            found: other.type_name(),
        }),
        None => Ok(Value::Null),
    });
    assert_eq!(double.call(&[Value::Int(4)]), Ok(Value::Int(8)));
    assert!(double.call(&[Value::from("x")]).is_err());
    assert_eq!(format!("{:?}", double), "Callable(double)");
    assert!(double.ptr_eq(&double.clone()));
}
