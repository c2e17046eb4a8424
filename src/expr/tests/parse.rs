//! Parser structure tests

use crate::error::ResolveError;
use crate::expr::*;

fn path(names: &[&str]) -> Expr {
    Expr::Path(Path {
        segments: names
            .iter()
            .map(|n| Segment {
                name: n.to_string(),
                args: None,
            })
            .collect(),
    })
}

fn int(i: i64) -> Expr {
    Expr::Literal(Literal::Int(i))
}

fn string(s: &str) -> Expr {
    Expr::Literal(Literal::Str(s.to_string()))
}

#[test]
fn test_parse_dotted_path() {
    assert_eq!(parse("user.profile.name").unwrap(), path(&["user", "profile", "name"]));
    assert_eq!(parse("items.0").unwrap(), path(&["items", "0"]));
}

#[test]
fn test_parse_method_call_mid_path() {
    let expr = parse("post.url(\"abs\", 2).host").unwrap();
    let Expr::Path(p) = expr else {
        panic!("expected path");
    };
    assert_eq!(p.segments.len(), 3);
    assert_eq!(p.segments[1].name, "url");
    assert_eq!(p.segments[1].args, Some(vec![string("abs"), int(2)]));
    assert_eq!(p.segments[2].args, None);
    assert_eq!(p.to_string(), "post.url(..).host");
}

#[test]
fn test_parse_concat_binds_tighter_than_comma() {
    assert_eq!(
        parse("\"a\" ~ b, c").unwrap(),
        Expr::List(vec![
            Expr::Concat(vec![string("a"), path(&["b"])]),
            path(&["c"]),
        ])
    );
}

#[test]
fn test_parse_nested_array_and_call_arguments() {
    let expr = parse("f([1, [2, 3]], g(4, 5) ~ \"x\")").unwrap();
    let Expr::Path(p) = expr else {
        panic!("expected path");
    };
    let args = p.segments[0].args.clone().unwrap();
    assert_eq!(args.len(), 2);
    assert!(matches!(&args[0], Expr::Array(items) if items.len() == 2));
    assert!(matches!(&args[1], Expr::Concat(parts) if parts.len() == 2));
}

#[test]
fn test_parse_keyed_array() {
    let expr = parse("[\"a\" => 1, 2]").unwrap();
    assert_eq!(
        expr,
        Expr::Array(vec![
            ArrayItem {
                key: Some(string("a")),
                value: int(1),
            },
            ArrayItem {
                key: None,
                value: int(2),
            },
        ])
    );
    assert_eq!(parse("[]").unwrap(), Expr::Array(vec![]));
    assert_eq!(parse("[1,]").unwrap(), Expr::Array(vec![ArrayItem { key: None, value: int(1) }]));
}

#[test]
fn test_parse_literals() {
    assert_eq!(parse("true").unwrap(), Expr::Literal(Literal::Bool(true)));
    assert_eq!(parse("false").unwrap(), Expr::Literal(Literal::Bool(false)));
    assert_eq!(parse("-1.5").unwrap(), Expr::Literal(Literal::Float(-1.5)));
    assert_eq!(parse("").unwrap(), Expr::empty());
    assert_eq!(parse("   ").unwrap(), Expr::empty());
}

#[test]
fn test_parse_lang() {
    assert_eq!(
        parse("Lang.users.welcome(name)").unwrap(),
        Expr::Lang {
            key: "users.welcome".to_string(),
            args: Some(vec![path(&["name"])]),
        }
    );
    assert_eq!(
        parse("Lang.greeting").unwrap(),
        Expr::Lang {
            key: "greeting".to_string(),
            args: None,
        }
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse("a b"), Err(ResolveError::Syntax { .. })));
    assert!(matches!(parse("f(1"), Err(ResolveError::Syntax { .. })));
    assert!(matches!(parse("[1, 2"), Err(ResolveError::Syntax { .. })));
    assert!(matches!(parse("a.."), Err(ResolveError::Syntax { .. })));
}

#[test]
fn test_condition_precedence() {
    let cond = parse_condition("a or b and c").unwrap();
    let value = |name: &str| Condition::Value(path(&[name]));
    assert_eq!(
        cond,
        Condition::Or(
            Box::new(value("a")),
            Box::new(Condition::And(Box::new(value("b")), Box::new(value("c")))),
        )
    );
    assert_eq!(parse_condition("a || b && c").unwrap(), cond);
    assert_eq!(parse_condition("a OR b AND c").unwrap(), cond);
}

#[test]
fn test_condition_not_and_grouping() {
    let cond = parse_condition("1 == 1 and not (2 == 3)").unwrap();
    let Condition::And(lhs, rhs) = cond else {
        panic!("expected and");
    };
    assert_eq!(
        *lhs,
        Condition::Compare {
            op: CompareOp::Eq,
            lhs: int(1),
            rhs: int(1),
        }
    );
    assert!(matches!(
        rhs.as_ref(),
        Condition::Not(inner) if matches!(inner.as_ref(), Condition::Compare { op: CompareOp::Eq, .. })
    ));
}

#[test]
fn test_condition_operators() {
    for (text, op) in [
        ("a == b", CompareOp::Eq),
        ("a != b", CompareOp::NotEq),
        ("a === b", CompareOp::Identical),
        ("a !== b", CompareOp::NotIdentical),
        ("a < b", CompareOp::Lt),
        ("a <= b", CompareOp::Le),
        ("a > b", CompareOp::Gt),
        ("a >= b", CompareOp::Ge),
    ] {
        match parse_condition(text).unwrap() {
            Condition::Compare { op: found, .. } => assert_eq!(found, op, "{}", text),
            other => panic!("{} parsed as {:?}", text, other),
        }
    }
    assert!(parse_condition("a == b == c").is_err());
}

#[test]
fn test_condition_parenthesized_operand() {
    assert_eq!(
        parse_condition("(a) == 1").unwrap(),
        Condition::Compare {
            op: CompareOp::Eq,
            lhs: path(&["a"]),
            rhs: int(1),
        }
    );
    assert_eq!(
        parse_condition("(\"x\" ~ \"y\") == \"xy\"").unwrap(),
        Condition::Compare {
            op: CompareOp::Eq,
            lhs: Expr::Concat(vec![string("x"), string("y")]),
            rhs: string("xy"),
        }
    );
    assert_eq!(
        parse_condition("(a) ~ \"b\"").unwrap(),
        Condition::Value(Expr::Concat(vec![path(&["a"]), string("b")]))
    );
    // groups that hold a real condition stay groups
    assert!(matches!(
        parse_condition("(a == 1) or b").unwrap(),
        Condition::Or(lhs, _) if matches!(lhs.as_ref(), Condition::Compare { .. })
    ));
    assert!(parse_condition("(a == 1) == b").is_err());
}
