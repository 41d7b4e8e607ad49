// ── Raw payload ──
//
// The single decode step between transport and everything else: a JSON
// body is classified once into one of four shapes, and downstream code
// matches on the shape instead of re-inspecting `Value`s.

use serde::Serialize;
use serde_json::{Map, Value};

/// A decoded response body, classified by top-level shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum RawPayload {
    /// `null` or an empty response body.
    #[default]
    Absent,
    /// A bare JSON array.
    Sequence(Vec<Value>),
    /// A JSON object, field order preserved.
    Mapping(Map<String, Value>),
    /// Any other scalar (string, number, boolean).
    Scalar(Value),
}

impl RawPayload {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Rebuild the original JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::Sequence(items) => Value::Array(items.clone()),
            Self::Mapping(map) => Value::Object(map.clone()),
            Self::Scalar(value) => value.clone(),
        }
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => Self::Mapping(map),
            other => Self::Scalar(other),
        }
    }
}

impl From<Option<Value>> for RawPayload {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Absent, Self::from)
    }
}
