//! Structural dump tests

use crate::value::Value;

#[test]
fn test_dump_scalars() {
    assert_eq!(Value::Null.dump(), "NULL\n");
    assert_eq!(Value::Bool(true).dump(), "bool(true)\n");
    assert_eq!(Value::Int(5).dump(), "int(5)\n");
    assert_eq!(Value::Float(1.5).dump(), "float(1.5)\n");
    assert_eq!(Value::from("héllo").dump(), "string(6) \"héllo\"\n");
}

#[test]
fn test_dump_nested() {
    let value = Value::List(vec![
        Value::Int(1),
        Value::map([("name", "abc")]),
    ]);
    let expected = "\
array(2) {
  [0]=>
  int(1)
  [1]=>
  array(1) {
    [\"name\"]=>
    string(3) \"abc\"
  }
}
";
    assert_eq!(value.dump(), expected);
}
