//! Dynamic Values
//!
//! [`Value`] models the untyped data that reactive state commonly holds when
//! it is driven from configuration, JSON payloads or a scripting layer:
//! undefined, null, booleans, numbers, strings, arrays, records and opaque
//! host references.
//!
//! Records preserve insertion order ([`IndexMap`]) so that iteration, display
//! and JSON output follow the order properties were declared in.
//!
//! Values also carry the two coercions a reactive state handle needs to be
//! usable in string and numeric contexts: [`Display`](fmt::Display) and
//! [`Value::to_number`].

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{ReactiveError, Result};
use crate::reactive::equal;

/// Ordered property table of a record value.
pub type Record = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    /// No value at all. Distinct from `Null`.
    #[default]
    Undefined,
    /// The explicit empty value.
    Null,
    Bool(bool),
    /// IEEE 754 double; may be NaN.
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Record),
    /// A host reference compared by identity only.
    Opaque(Opaque),
}

/// Reference-counted host object compared by pointer identity.
#[derive(Clone)]
pub struct Opaque(Rc<dyn Any>);

impl Opaque {
    /// Wrap a host value.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

impl Value {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(parsed.into())
    }

    /// Serialize to a JSON string.
    ///
    /// Follows the usual JSON conventions for values JSON cannot express:
    /// undefined record properties are omitted, undefined array slots and
    /// non-finite numbers become `null`. A top-level undefined or any opaque
    /// value is an error.
    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::Value::try_from(self)?;
        Ok(serde_json::to_string(&json)?)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for both `Undefined` and `Null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    /// Name of the value's kind, as used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Numeric coercion.
    ///
    /// `undefined`, records and opaque values become NaN, `null` and `false`
    /// become 0, strings are trimmed and parsed (empty means 0), arrays are
    /// converted through their string form.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined | Value::Object(_) | Value::Opaque(_) => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => parse_number(s),
            Value::Array(_) => parse_number(&self.to_string()),
        }
    }
}

/// Numeric coercion used by [`ScalarState::value_of`].
///
/// [`ScalarState::value_of`]: crate::reactive::ScalarState::value_of
pub trait ToNumber {
    fn to_number(&self) -> f64;
}

macro_rules! impl_to_number {
    ($($t:ty),*) => {
        $(
            impl ToNumber for $t {
                fn to_number(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_to_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ToNumber for bool {
    fn to_number(&self) -> f64 {
        f64::from(u8::from(*self))
    }
}

impl ToNumber for str {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl ToNumber for String {
    fn to_number(&self) -> f64 {
        parse_number(self)
    }
}

impl ToNumber for Value {
    fn to_number(&self) -> f64 {
        Value::to_number(self)
    }
}

/// String to number with the rules of a JS `Number(text)` call.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d));
    }

    let unsigned = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    // Rust also accepts "inf", "nan" and friends; JS only digits, dot and exponent.
    let decimal = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Integral numbers serialize without a fraction, NaN and infinities as null.
fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        // exact: |n| < 2^53
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // covers -0
        f.write_str("0")
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Opaque(_) => f.write_str("[object Opaque]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(record) => f.debug_map().entries(record.iter()).finish(),
            Value::Opaque(o) => fmt::Debug::fmt(o, f),
        }
    }
}

/// Structural equality, so NaN equals NaN here.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record)
    }
}

impl From<Opaque> for Value {
    fn from(o: Opaque) -> Self {
        Value::Opaque(o)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = ReactiveError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Undefined => Err(ReactiveError::NotRepresentable {
                reason: "undefined has no JSON form".into(),
            }),
            Value::Opaque(_) => Err(ReactiveError::NotRepresentable {
                reason: "opaque host references have no JSON form".into(),
            }),
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Number(n) => Ok(json_number(*n)),
            Value::String(s) => Ok(serde_json::Value::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined => Ok(serde_json::Value::Null),
                    other => serde_json::Value::try_from(other),
                })
                .collect::<Result<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Object(record) => {
                let mut map = serde_json::Map::with_capacity(record.len());
                for (key, item) in record {
                    if item.is_undefined() {
                        continue;
                    }
                    map.insert(key.clone(), serde_json::Value::try_from(item)?);
                }
                Ok(serde_json::Value::Object(map))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_string_coercion() {
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Undefined.to_string(), "undefined");

        let arr: Value = vec![Value::from(1), Value::Null, Value::from("x")].into();
        assert_eq!(arr.to_string(), "1,,x");

        let obj: Value = [("a", Value::from(1))].into_iter().collect();
        assert_eq!(obj.to_string(), "[object Object]");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert_eq!(Value::from("  42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert!(Value::from("forty").to_number().is_nan());
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Array(vec![]).to_number(), 0.0);
        assert_eq!(Value::Array(vec![Value::from(7)]).to_number(), 7.0);
    }

    #[test]
    fn numeric_coercion_follows_js_spellings() {
        assert_eq!(Value::from("0x10").to_number(), 16.0);
        assert_eq!(Value::from("0b101").to_number(), 5.0);
        assert_eq!(Value::from("0o17").to_number(), 15.0);
        assert_eq!(Value::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert_eq!(Value::from(".5e1").to_number(), 5.0);
        assert_eq!(Value::from("+3").to_number(), 3.0);

        for text in ["inf", "infinity", "NaN", "nan", "0x", "0xZZ", "-0x10", "1_000"] {
            assert!(Value::from(text).to_number().is_nan(), "{text}");
        }
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let value = Value::from_json(r#"{"b": 1, "a": [true, null, "s"]}"#).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(value.to_json().unwrap(), r#"{"b":1,"a":[true,null,"s"]}"#);
    }

    #[test]
    fn json_rejects_unrepresentable_values() {
        assert!(matches!(
            Value::Undefined.to_json(),
            Err(ReactiveError::NotRepresentable { .. })
        ));
        assert!(Value::Opaque(Opaque::new(3_u8)).to_json().is_err());

        let record: Value = [("gone", Value::Undefined), ("kept", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(record.to_json().unwrap(), r#"{"kept":null}"#);
        assert_eq!(Value::from(f64::NAN).to_json().unwrap(), "null");
    }

    #[test]
    fn opaque_compares_by_identity() {
        let a = Opaque::new(String::from("host"));
        let b = a.clone();
        let c = Opaque::new(String::from("host"));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert_eq!(a.downcast_ref::<String>().map(String::as_str), Some("host"));
        assert!(a.downcast_ref::<u32>().is_none());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(3)), Value::Number(3.0));
    }
}
