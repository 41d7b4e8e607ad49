// ── Record ──
//
// One JSON entity from any list endpoint. Records stay loosely typed:
// Wizarr versions disagree on field sets, so accessors return `Option`
// and every downstream consumer degrades instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record_id::RecordId;

/// A single decoded entity (user, library, invitation, server, API key).
///
/// Usually a JSON object. Non-object elements of a list payload are kept
/// as-is so list length and order survive normalization; every accessor
/// on such a record returns `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub(crate) fn as_object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.as_object_mut()
    }

    /// Raw field access. `None` for a missing field or a non-object record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// A field holding a non-empty string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The record's usable identity, if any.
    pub fn id(&self) -> Option<RecordId> {
        self.get("id").and_then(RecordId::from_value)
    }

    /// A mapping counts as record-like when it carries a usable `id`.
    pub fn is_record_like(map: &Map<String, Value>) -> bool {
        map.get("id").and_then(RecordId::from_value).is_some()
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
