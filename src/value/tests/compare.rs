//! Truthiness and comparison tests

use crate::value::Value;

#[test]
fn test_truthiness() {
    for falsy in [
        Value::Null,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::from(""),
        Value::from("0"),
        Value::List(vec![]),
        Value::map(Vec::<(String, Value)>::new()),
    ] {
        assert!(!falsy.is_truthy(), "{:?} should be falsy", falsy);
    }
    for truthy in [
        Value::Bool(true),
        Value::Int(-1),
        Value::from("0.0"),
        Value::from("false"),
        Value::from(vec![0]),
    ] {
        assert!(truthy.is_truthy(), "{:?} should be truthy", truthy);
    }
}

#[test]
fn test_loose_equality() {
    assert!(Value::Int(1).loose_eq(&Value::from("1")));
    assert!(Value::from("1.0").loose_eq(&Value::from("1")));
    assert!(Value::Int(5).loose_eq(&Value::Float(5.0)));
    assert!(Value::Null.loose_eq(&Value::Bool(false)));
    assert!(Value::Null.loose_eq(&Value::from("")));
    assert!(!Value::Null.loose_eq(&Value::from("0")));
    assert!(Value::Bool(true).loose_eq(&Value::from("yes")));
    assert!(!Value::from("abc").loose_eq(&Value::Int(0)));
    assert!(Value::from(vec![1, 2]).loose_eq(&Value::from(vec!["1", "2"])));
}

#[test]
fn test_strict_equality() {
    assert!(Value::Int(1).strict_eq(&Value::Int(1)));
    assert!(!Value::Int(1).strict_eq(&Value::from("1")));
    assert!(!Value::Int(5).strict_eq(&Value::Float(5.0)));
    assert!(!Value::Null.strict_eq(&Value::Bool(false)));
    assert!(Value::from("x").strict_eq(&Value::from("x")));
}

#[test]
fn test_structural_map_equality_ignores_order() {
    let a = Value::map([("a", 1), ("b", 2)]);
    let b = Value::map([("b", 2), ("a", 1)]);
    assert_eq!(a, b);
    assert!(!a.strict_eq(&b));
}
