//! Primitive command parameter values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive parameter value.
///
/// Null, list and object values are not representable; proposals carrying them are
/// rejected before a plan is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// Text.
    Text(String),
}

impl ParamValue {
    /// Convert a JSON value, returning `None` for non-primitive values.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    /// Convert to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Number(n) => serde_json::Value::from(*n),
            Self::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Borrow the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_accepts_primitives() {
        assert_eq!(ParamValue::from_json(&json!(true)), Some(ParamValue::Bool(true)));
        assert_eq!(ParamValue::from_json(&json!(100)), Some(ParamValue::Integer(100)));
        assert_eq!(ParamValue::from_json(&json!(99.5)), Some(ParamValue::Number(99.5)));
        assert_eq!(
            ParamValue::from_json(&json!("O-1")),
            Some(ParamValue::Text("O-1".to_string()))
        );
    }

    #[test]
    fn from_json_rejects_structured_values() {
        assert_eq!(ParamValue::from_json(&json!(null)), None);
        assert_eq!(ParamValue::from_json(&json!([1, 2])), None);
        assert_eq!(ParamValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn untagged_serde_keeps_integers_integral() {
        let value: ParamValue = serde_json::from_str("100").unwrap();
        assert_eq!(value, ParamValue::Integer(100));
        assert_eq!(serde_json::to_string(&value).unwrap(), "100");
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(ParamValue::from("abc").to_string(), "abc");
        assert_eq!(ParamValue::from(7_i64).to_string(), "7");
    }
}
