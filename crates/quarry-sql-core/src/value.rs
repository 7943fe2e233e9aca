//! SQL literal values.
//!
//! [`Value`] is the scalar/array/date side of the expression tree: everything
//! a caller can embed as a literal. How a value becomes SQL text is up to the
//! [`Dialect`](crate::Dialect); this module only carries the data.

use chrono::{DateTime, FixedOffset, SecondsFormat};

/// A literal value in a query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// A point in time, carrying the caller's UTC offset.
    ///
    /// The offset travels with the value so the dialect can state the
    /// caller's timezone explicitly instead of assuming the server shares it.
    DateTime(DateTime<FixedOffset>),
    /// An array of values (scalars or nested structures).
    Array(Vec<Value>),
    /// A pre-built JSON document.
    Json(serde_json::Value),
}

impl Value {
    /// Returns true for plain scalars (null, bool, numbers, text).
    ///
    /// Blobs, dates, arrays and documents all need dialect-specific
    /// treatment and are deliberately not scalars here.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Text(_)
        )
    }

    /// Converts the value into a JSON document.
    ///
    /// Used when a whole array must be serialized as one JSON text literal.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::from(*b),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Text(s) => serde_json::Value::from(s.as_str()),
            Self::Blob(b) => serde_json::Value::from(b.clone()),
            Self::DateTime(dt) => {
                serde_json::Value::from(dt.to_rfc3339_opts(SecondsFormat::Secs, false))
            }
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Json(doc) => doc.clone(),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToValue {
    /// Converts the value to a [`Value`].
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for i16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for &[u8] {
    fn to_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for DateTime<FixedOffset> {
    fn to_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::Array(self.into_iter().map(ToValue::to_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_classification() {
        assert!(Value::Null.is_scalar());
        assert!(Value::Bool(true).is_scalar());
        assert!(Value::Text(String::from("x")).is_scalar());
        assert!(!Value::Array(vec![]).is_scalar());
        assert!(!Value::Blob(vec![1, 2]).is_scalar());
    }

    #[test]
    fn test_to_value_conversions() {
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(42_i32.to_value(), Value::Int(42));
        assert_eq!("hello".to_value(), Value::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_value(), Value::Null);
        assert_eq!(
            vec!["a", "b"].to_value(),
            Value::Array(vec![
                Value::Text(String::from("a")),
                Value::Text(String::from("b"))
            ])
        );
    }

    #[test]
    fn test_array_to_json() {
        let value = Value::Array(vec![
            Value::Int(1),
            Value::Json(serde_json::json!({"a": 2})),
        ]);
        assert_eq!(value.to_json(), serde_json::json!([1, {"a": 2}]));
    }
}
