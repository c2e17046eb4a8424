//! Truthiness and comparison semantics
//!
//! Conditions in templates follow loose scripting-language rules:
//! numeric strings compare as numbers, booleans compare by truthiness and
//! `null` equals every falsy scalar. `===` and `!==` compare variant and
//! payload exactly.

use std::cmp::Ordering;
use std::sync::Arc;

use super::Value;

impl Value {
    /// Whether the value counts as true in a condition
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object(_) | Value::Callable(_) => true,
        }
    }

    /// Numeric view of numbers and numeric strings
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// `==`
    pub fn loose_eq(
        &self,
        other: &Value,
    ) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(_), _) | (_, Value::Bool(_)) => self.is_truthy() == other.is_truthy(),
            (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
            (Value::Null, v) | (v, Value::Null) => !v.is_truthy(),
            (Value::String(a), Value::String(b)) => match (parse_numeric(a), parse_numeric(b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map(|w| v.loose_eq(w)).unwrap_or(false))
            }
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => match (self, other) {
                    (Value::String(_), Value::Int(_) | Value::Float(_))
                    | (Value::Int(_) | Value::Float(_), Value::String(_)) => {
                        self.to_output_string() == other.to_output_string()
                    }
                    _ => false,
                },
            },
        }
    }

    /// `===`
    pub fn strict_eq(
        &self,
        other: &Value,
    ) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.strict_eq(vb))
            }
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Ordering used by `<`, `>`, `<=`, `>=`
    pub fn loose_cmp(
        &self,
        other: &Value,
    ) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(_), _) | (_, Value::Bool(_)) | (Value::Null, _) | (_, Value::Null) => {
                Some(self.is_truthy().cmp(&other.is_truthy()))
            }
            (Value::List(a), Value::List(b)) => Some(a.len().cmp(&b.len())),
            (Value::Map(a), Value::Map(b)) => Some(a.len().cmp(&b.len())),
            _ => match (self.as_number(), other.as_number()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => Some(self.to_output_string().cmp(&other.to_output_string())),
            },
        }
    }
}

/// Structural equality, used by tests and round-trip checks
impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            _ => self.strict_eq(other),
        }
    }
}

/// Parse the numeric-string forms a template author would write
///
/// Leading and trailing whitespace is allowed, as are a sign, a decimal
/// point and an exponent. Hex, octal and the empty string are not numeric.
pub(crate) fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let body = t.strip_prefix(['+', '-']).unwrap_or(t);
    let starts_ok = body
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.')
        .unwrap_or(false);
    if !starts_ok || body.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}
