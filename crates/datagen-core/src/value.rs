//! Generated record values.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One generated value: a scalar, an ordered list, or an ordered-key map.
///
/// `Value` is the record type the whole engine produces and consumes. It
/// serializes untagged, so records round-trip as plain JSON/YAML data.
///
/// Variant order matters for untagged deserialization: integers bind to
/// `Int64`, and `DateTime` sits after `String` so date-shaped strings stay
/// strings (timestamps are only ever produced by date nodes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int64(i64),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit floating point
    Float64(f64),

    /// String value
    String(String),

    /// Ordered sequence of values
    Array(Vec<Value>),

    /// Ordered-key mapping of values
    Object(IndexMap<String, Value>),

    /// Date/time with timezone
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Numeric coercion used by arithmetic nodes.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(f64::from(*v)),
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer coercion used by length-valued nodes.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) | Value::Int64(_) => "integer",
            Value::Float64(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Display form used by string transformers and switch/mapper matching.
    ///
    /// Scalars render bare (no quotes); composites render JSON-like.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::DateTime(v) => {
                write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trip_keeps_shapes() {
        let yaml = "- null\n- true\n- 42\n- 1.5\n- hello\n- [1, 2]\n- {a: 1}\n";
        let values: Vec<Value> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int64(42));
        assert_eq!(values[3], Value::Float64(1.5));
        assert_eq!(values[4], Value::String("hello".to_string()));
        assert_eq!(
            values[5],
            Value::Array(vec![Value::Int64(1), Value::Int64(2)])
        );
        assert!(matches!(values[6], Value::Object(_)));
    }

    #[test]
    fn test_date_shaped_strings_stay_strings() {
        let value: Value = serde_yaml::from_str("\"2024-01-01T00:00:00Z\"").unwrap();
        assert!(matches!(value, Value::String(_)));
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(Value::Null.render(), "null");
        assert_eq!(Value::Int64(7).render(), "7");
        assert_eq!(Value::String("x".into()).render(), "x");
        assert_eq!(Value::Bool(false).render(), "false");
    }

    #[test]
    fn test_render_composites() {
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), Value::Int64(1));
        let value = Value::Array(vec![Value::Object(fields), Value::Int64(2)]);
        assert_eq!(value.render(), "[{a: 1}, 2]");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Int32(3).as_f64(), Some(3.0));
        assert_eq!(Value::Int64(3).as_i64(), Some(3));
        assert_eq!(Value::Float64(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::String("3".into()).as_f64(), None);
    }
}
