//! Literal value model for the variable store.
//!
//! A [`Value`] is a closed-form constant: there is deliberately no variant
//! that could carry a name, a call, or an operator, so holding a `Value`
//! is proof that nothing needs to be evaluated to use it.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::literal::codec::write_literal;

/// A literal value as stored in the variables file.
///
/// Mappings preserve their written entry order and may be keyed by any
/// literal, not just strings; `{1: "one"}` is a valid stored value.
/// Equality is structural, so a mapping with reordered entries is a
/// different value; the codec never reorders entries, which is what makes
/// `parse(serialize(v)) == v` hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// Boolean, written as `True` / `False`.
    Bool(bool),
    /// Unicode string.
    Str(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Ordered mapping from literal keys to values.
    Map(Vec<(Value, Value)>),
    /// The null value, written as `None`.
    None,
}

impl Value {
    /// Returns the integer payload, or `None` for any other variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float; integers widen losslessly enough for
    /// control-loop use (e.g. a stored `0` feeding a float setpoint).
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, or `None` for any other variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the boolean payload, or `None` for any other variant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Serializes a value into the natural JSON shape for the status surface:
/// numbers as numbers, `None` as null, sequences as arrays, mappings as
/// objects. JSON object keys must be strings, so a non-string mapping key
/// is rendered as its canonical literal text (`1` → `"1"`).
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            // JSON has no representation for non-finite floats; fall back to
            // the literal text rather than failing the whole status report.
            Value::Float(_) => serializer.serialize_str(&write_literal(self)),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Str(v) => serializer.serialize_str(v),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    match key {
                        Value::Str(s) => map.serialize_entry(s, value)?,
                        other => map.serialize_entry(&write_literal(other), value)?,
                    }
                }
                map.end()
            }
            Value::None => serializer.serialize_unit(),
        }
    }
}
