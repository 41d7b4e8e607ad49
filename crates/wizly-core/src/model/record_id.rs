// ── Record identity ──
//
// Wizarr ids are usually integers, occasionally strings. They are opaque
// tokens: `1` and `"1"` are different ids and never coerced into each other.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a record, compared by raw equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Extract a usable id from a JSON value: an integer, or a non-empty
    /// string. Floats, booleans, nulls and containers are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn usable_ids() {
        assert_eq!(RecordId::from_value(&json!(7)), Some(RecordId::Int(7)));
        assert_eq!(RecordId::from_value(&json!("ab")), Some(RecordId::from("ab")));
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!(1.5)), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
        assert_eq!(RecordId::from_value(&json!(true)), None);
    }

    #[test]
    fn no_coercion_between_int_and_string() {
        assert_ne!(RecordId::Int(1), RecordId::from("1"));
        assert_eq!(RecordId::Int(1).to_string(), RecordId::from("1").to_string());
    }
}
